//! Backup and CSV subcommands

use std::fs::File;
use std::path::Path;

use anyhow::Context;

use wortkarte::storage::{read_snapshot, write_snapshot};
use wortkarte::transfer::{export_csv, import_csv};

use crate::app::App;

pub fn backup_export(app: &mut App, path: &Path) -> anyhow::Result<()> {
    let snapshot = app.store.export_snapshot()?;
    write_snapshot(path, &snapshot)?;
    println!(
        "wrote {} decks and {} cards to {}",
        snapshot.decks.len(),
        snapshot.cards.len(),
        path.display()
    );
    Ok(())
}

pub fn backup_import(app: &mut App, path: &Path, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("this replaces the whole store; re-run with --yes");
    }
    let snapshot = read_snapshot(path)?;
    app.store.restore_snapshot(&snapshot)?;
    println!(
        "restored {} decks and {} cards",
        snapshot.decks.len(),
        snapshot.cards.len()
    );
    Ok(())
}

pub fn csv_import(app: &mut App, deck_ref: &str, path: &Path) -> anyhow::Result<()> {
    let deck = app.resolve_deck(deck_ref)?;
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let report = import_csv(&mut app.store, deck.id, file)?;
    println!(
        "imported {} cards into {} ({} skipped)",
        report.imported, deck.name, report.skipped
    );
    Ok(())
}

pub fn csv_export(app: &App, deck_ref: &str, path: &Path) -> anyhow::Result<()> {
    let deck = app.resolve_deck(deck_ref)?;
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let written = export_csv(&app.store, deck.id, file)?;
    println!("wrote {} cards to {}", written, path.display());
    Ok(())
}
