use anyhow::{Context, Result, bail};
use bingo_cards::{
    BingoStore, Catalog, DocumentRequest, FsAssetSource, GameConfig, GridsPerPage, PaperSize,
    RenderOptions, Theme,
};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bingo", about = "Photo bingo card generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new game in the catalog
    NewGame {
        /// Catalog JSON file (created if missing)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Display name, also used for the output file name
        #[arg(short, long)]
        name: String,

        /// Cells per side
        #[arg(long, default_value = "5")]
        grid_size: usize,

        /// Number of cards to generate
        #[arg(long, default_value = "10")]
        cards: usize,

        #[arg(long, default_value = "one", value_enum)]
        grids_per_page: GridsPerPageArg,

        #[arg(long, default_value = "standard", value_enum)]
        theme: ThemeArg,
    },

    /// Add photos to a game from a CSV manifest
    ImportImages {
        #[arg(short, long)]
        catalog: PathBuf,

        /// Game id
        #[arg(short, long)]
        game: String,

        /// CSV file (columns: id, name, source)
        #[arg(long)]
        csv: PathBuf,
    },

    /// (Re)generate the cards of a game
    Generate {
        #[arg(short, long)]
        catalog: PathBuf,

        #[arg(short, long)]
        game: String,

        /// Seed for reproducible cards
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Export the generated cards as PDF
    Export {
        #[arg(short, long)]
        catalog: PathBuf,

        #[arg(short, long)]
        game: String,

        /// Directory photo sources are relative to
        #[arg(long, default_value = ".")]
        photos: PathBuf,

        /// Directory holding the theme background artwork
        #[arg(long)]
        assets: PathBuf,

        /// Output file (defaults to a name derived from the game)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the game's page packing
        #[arg(long, value_enum)]
        grids_per_page: Option<GridsPerPageArg>,

        /// Override the game's theme
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,

        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Render options JSON file
        #[arg(long)]
        options: Option<PathBuf>,

        /// Write the preview layout as JSON instead of a PDF
        #[arg(long)]
        preview: bool,
    },

    /// Draw the next photo of the game's active session
    Draw {
        #[arg(short, long)]
        catalog: PathBuf,

        #[arg(short, long)]
        game: String,

        /// Start a fresh session first
        #[arg(long)]
        new_session: bool,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GridsPerPageArg {
    One,
    Two,
    Four,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Standard,
    Christmas,
    Birthday,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    A5,
    Letter,
}

impl From<GridsPerPageArg> for GridsPerPage {
    fn from(arg: GridsPerPageArg) -> Self {
        match arg {
            GridsPerPageArg::One => Self::One,
            GridsPerPageArg::Two => Self::Two,
            GridsPerPageArg::Four => Self::Four,
        }
    }
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Standard => Self::Standard,
            ThemeArg::Christmas => Self::Christmas,
            ThemeArg::Birthday => Self::Birthday,
        }
    }
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
        }
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Grid ids of the game's current group, in generation order
fn current_grid_ids(catalog: &Catalog, game_id: &str) -> Result<Vec<String>> {
    let Some(group) = catalog.list_grid_groups(game_id)?.pop() else {
        bail!("game {} has no cards yet; run `bingo generate` first", game_id);
    };
    Ok(catalog
        .list_grids(&group.id)?
        .into_iter()
        .map(|grid| grid.id)
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::NewGame {
            catalog: catalog_path,
            name,
            grid_size,
            cards,
            grids_per_page,
            theme,
        } => {
            let mut catalog = Catalog::load_or_default(&catalog_path).await?;
            let game = GameConfig {
                grid_size,
                card_count: cards,
                grids_per_page: grids_per_page.into(),
                theme: theme.into(),
                ..GameConfig::new(bingo_cards::new_id(), name)
            };
            let id = game.id.clone();
            catalog.add_game(game)?;
            catalog.save(&catalog_path).await?;
            println!("{}", id);
        }

        Commands::ImportImages {
            catalog: catalog_path,
            game,
            csv,
        } => {
            let mut catalog = Catalog::load(&catalog_path).await?;
            let images = bingo_cards::import_images_csv(&csv, &game).await?;
            let count = images.len();
            for image in images {
                catalog.add_image(image)?;
            }
            catalog.save(&catalog_path).await?;

            let config = catalog.get_game(&game)?;
            let pool = catalog.list_images(&game)?.len();
            println!("Imported {} images ({} in pool)", count, pool);
            if pool < config.required_images() {
                log::warn!(
                    "{}x{} cards need at least {} images",
                    config.grid_size,
                    config.grid_size,
                    config.required_images()
                );
            }
        }

        Commands::Generate {
            catalog: catalog_path,
            game,
            seed,
        } => {
            let mut catalog = Catalog::load(&catalog_path).await?;
            let (group, grids) =
                bingo_cards::generate_grid_group(&mut catalog, &game, &mut rng(seed))?;
            catalog.save(&catalog_path).await?;
            println!("Generated {} cards in '{}'", grids.len(), group.name);
        }

        Commands::Export {
            catalog: catalog_path,
            game,
            photos,
            assets,
            output,
            grids_per_page,
            theme,
            paper,
            options,
            preview,
        } => {
            let catalog = Catalog::load(&catalog_path).await?;
            let config = catalog.get_game(&game)?;

            let mut request = DocumentRequest::for_game(&config, current_grid_ids(&catalog, &game)?);
            if let Some(grids_per_page) = grids_per_page {
                request.grids_per_page = grids_per_page.into();
            }
            if let Some(theme) = theme {
                request.theme = theme.into();
            }

            let mut render_options = match &options {
                Some(path) => RenderOptions::load(path)
                    .await
                    .with_context(|| format!("loading {}", path.display()))?,
                None => RenderOptions::default(),
            };
            if let Some(paper) = paper {
                render_options.paper_size = paper.into();
            }

            let photos = Arc::new(FsAssetSource::new(photos));
            let backgrounds = Arc::new(FsAssetSource::new(assets));

            if preview {
                let tree = bingo_cards::generate_preview(
                    &catalog,
                    photos,
                    backgrounds,
                    &request,
                    &render_options,
                )
                .await?;
                let json = tree.to_json()?;
                match output {
                    Some(path) => {
                        tokio::fs::write(&path, json).await?;
                        println!("Preview → {}", path.display());
                    }
                    None => println!("{}", json),
                }
                return Ok(());
            }

            let document = bingo_cards::generate_document(
                &catalog,
                photos,
                backgrounds,
                &request,
                &render_options,
            )
            .await?;
            let path = output.unwrap_or_else(|| PathBuf::from(&document.file_name));
            tokio::fs::write(&path, &document.bytes).await?;
            println!(
                "Exported {} pages → {}",
                document.page_count,
                path.display()
            );
            if document.missing_assets > 0 {
                println!("  {} images could not be embedded", document.missing_assets);
            }
        }

        Commands::Draw {
            catalog: catalog_path,
            game,
            new_session,
            seed,
        } => {
            let mut catalog = Catalog::load(&catalog_path).await?;
            let pool = catalog.list_images(&game)?;
            let grids = match current_grid_ids(&catalog, &game) {
                Ok(ids) => catalog.get_grids(&ids)?,
                Err(_) => Vec::new(),
            };

            if new_session || catalog.active_session_mut(&game).is_none() {
                let number = catalog.sessions.iter().filter(|s| s.game_id == game).count() + 1;
                catalog.start_session(&game, &format!("Session {}", number))?;
            }
            let Some(session) = catalog.active_session_mut(&game) else {
                bail!("no active session for game {}", game);
            };

            let Some(image_id) = session.draw_next(&pool, &mut rng(seed)) else {
                println!("Every image has been drawn");
                return Ok(());
            };
            let drawn = session.drawn.clone();

            let name = pool
                .iter()
                .find(|image| image.id == image_id)
                .map(|image| image.name.as_str())
                .unwrap_or(image_id.as_str());
            println!("Drew {} ({}/{})", name, drawn.len(), pool.len());

            for grid in grids
                .iter()
                .filter(|grid| bingo_cards::is_winning_line(grid, &drawn))
            {
                println!("  {} has a complete line", grid.name);
            }

            catalog.save(&catalog_path).await?;
        }
    }

    Ok(())
}
