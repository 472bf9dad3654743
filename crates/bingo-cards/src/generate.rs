//! Card generation and document export entry points

use crate::allocate::{allocate, required_images_per_grid};
use crate::assets::{AssetCache, AssetKind, AssetSource, NormalizeSettings};
use crate::compose::{ComposedDocument, composite, required_backgrounds};
use crate::options::{GameConfig, RenderOptions};
use crate::render::{PreviewDocument, write_pdf};
use crate::store::BingoStore;
use crate::theme::ThemeStyle;
use crate::types::*;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Download name for a document: every character outside `[A-Za-z0-9]`
/// becomes `_`, then `_cards.<ext>` is appended.
pub fn suggested_file_name(display_name: &str, extension: &str) -> String {
    let stem: String = display_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "bingo".to_string() } else { stem };
    format!("{}_cards.{}", stem, extension)
}

/// (Re)generate the grid group of a game.
///
/// Any previous group of the game is deleted first, together with its grids.
pub fn generate_grid_group<S, R>(store: &mut S, game_id: &str, rng: &mut R) -> Result<(GridGroup, Vec<Grid>)>
where
    S: BingoStore + ?Sized,
    R: Rng + ?Sized,
{
    let game = store.get_game(game_id)?;
    game.validate()?;

    let mut pool = store.list_images(game_id)?;
    let mut seen = HashSet::new();
    pool.retain(|image| seen.insert(image.id.clone()));

    let required = required_images_per_grid(game.grid_size);
    if pool.len() < required {
        return Err(BingoError::InsufficientImages {
            required,
            available: pool.len(),
        });
    }

    for previous in store.list_grid_groups(game_id)? {
        log::debug!("Deleting previous grid group {}", previous.name);
        store.delete_grid_group(&previous.id)?;
    }

    let cards = allocate(&pool, game.grid_size, game.card_count, rng)?;
    let group = store.create_grid_group(
        game_id,
        &format!("Cards - {}", game.display_name),
        game.grid_size,
    )?;
    let grids = store.create_grids(&group.id, cards)?;

    log::info!(
        "Generated {} {}x{} cards for '{}'",
        grids.len(),
        game.grid_size,
        game.grid_size,
        game.display_name
    );
    Ok((group, grids))
}

/// What to export
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRequest {
    pub grid_ids: Vec<String>,
    pub game_id: String,
    pub grids_per_page: GridsPerPage,
    pub theme: Theme,
    pub display_name: String,
}

impl DocumentRequest {
    /// Export `grid_ids` with the game's own packing and theme
    pub fn for_game(game: &GameConfig, grid_ids: Vec<String>) -> Self {
        Self {
            grid_ids,
            game_id: game.id.clone(),
            grids_per_page: game.grids_per_page,
            theme: game.theme,
            display_name: game.display_name.clone(),
        }
    }
}

/// A finished PDF
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub page_count: usize,
    /// Assets that degraded to empty during this run
    pub missing_assets: usize,
}

/// Render the requested grids to a PDF.
///
/// Precondition failures are reported before any asset is fetched. A failed
/// run returns no bytes.
pub async fn generate_document<S, P, B>(
    store: &S,
    photos: Arc<P>,
    backgrounds: Arc<B>,
    request: &DocumentRequest,
    options: &RenderOptions,
) -> Result<GeneratedDocument>
where
    S: BingoStore + ?Sized,
    P: AssetSource,
    B: AssetSource,
{
    let (composed, assets) = prepare(store, photos, backgrounds, request, options).await?;
    let page_count = composed.page_count();
    let missing_assets = assets.missing_count();

    let title = request.display_name.clone();
    let bytes =
        tokio::task::spawn_blocking(move || write_pdf(&composed, &assets, &title)).await??;

    let file_name = suggested_file_name(&request.display_name, "pdf");
    log::info!(
        "Wrote {} ({} pages, {} bytes, {} missing assets)",
        file_name,
        page_count,
        bytes.len(),
        missing_assets
    );

    Ok(GeneratedDocument {
        bytes,
        file_name,
        page_count,
        missing_assets,
    })
}

/// Build the on-screen preview tree for the requested grids
pub async fn generate_preview<S, P, B>(
    store: &S,
    photos: Arc<P>,
    backgrounds: Arc<B>,
    request: &DocumentRequest,
    options: &RenderOptions,
) -> Result<PreviewDocument>
where
    S: BingoStore + ?Sized,
    P: AssetSource,
    B: AssetSource,
{
    let (composed, _) = prepare(store, photos, backgrounds, request, options).await?;
    Ok(PreviewDocument::from(&composed))
}

async fn prepare<S, P, B>(
    store: &S,
    photos: Arc<P>,
    backgrounds: Arc<B>,
    request: &DocumentRequest,
    options: &RenderOptions,
) -> Result<(ComposedDocument, AssetCache)>
where
    S: BingoStore + ?Sized,
    P: AssetSource,
    B: AssetSource,
{
    options.validate()?;
    if request.grid_ids.is_empty() {
        return Err(BingoError::NoGrids);
    }
    store.get_game(&request.game_id)?;
    let grids = store.get_grids(&request.grid_ids)?;
    let images = store.list_images(&request.game_id)?;

    let style = ThemeStyle::for_theme(request.theme);
    let settings = NormalizeSettings::from(options);
    let started = Instant::now();
    let mut assets = AssetCache::new();

    let referenced: HashSet<&str> = grids
        .iter()
        .flat_map(|grid| grid.cells.iter().filter_map(Cell::image_id))
        .collect();
    let photo_refs: Vec<SourceRef> = images
        .iter()
        .filter(|image| referenced.contains(image.id.as_str()))
        .map(|image| image.source.clone())
        .collect();

    assets
        .resolve_all(
            photos,
            photo_refs,
            AssetKind::Photo,
            &settings,
            options.asset_workers,
            remaining(options.asset_deadline(), started)?,
        )
        .await?;

    let background_refs = required_backgrounds(&style, request.grids_per_page, grids.len());
    assets
        .resolve_all(
            backgrounds,
            background_refs,
            AssetKind::Background,
            &settings,
            options.asset_workers,
            remaining(options.asset_deadline(), started)?,
        )
        .await?;

    log::debug!(
        "Resolved {} assets in {:?}",
        assets.len(),
        started.elapsed()
    );

    let composed = composite(
        &grids,
        &images,
        &style,
        request.grids_per_page,
        options,
        &assets,
    );
    Ok((composed, assets))
}

/// Time left of a deadline shared by several fetch phases
fn remaining(deadline: Option<Duration>, started: Instant) -> Result<Option<Duration>> {
    match deadline {
        None => Ok(None),
        Some(limit) => match limit.checked_sub(started.elapsed()) {
            Some(left) if !left.is_zero() => Ok(Some(left)),
            _ => Err(BingoError::AssetTimeout),
        },
    }
}
