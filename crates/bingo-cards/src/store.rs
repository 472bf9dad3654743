//! Persistent data the engine reads from and writes grids back to

use crate::draw::DrawSession;
use crate::options::GameConfig;
use crate::types::*;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fresh random identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// CRUD surface over games, images, grid groups and grids
pub trait BingoStore {
    fn get_game(&self, game_id: &str) -> Result<GameConfig>;

    /// Image pool of a game, in insertion order
    fn list_images(&self, game_id: &str) -> Result<Vec<BingoImage>>;

    fn list_grid_groups(&self, game_id: &str) -> Result<Vec<GridGroup>>;

    /// Grids of a group, in generation order
    fn list_grids(&self, group_id: &str) -> Result<Vec<Grid>>;

    /// Grids by id, in the order requested. Unknown ids are an error.
    fn get_grids(&self, grid_ids: &[String]) -> Result<Vec<Grid>>;

    fn create_grid_group(&mut self, game_id: &str, name: &str, size: usize) -> Result<GridGroup>;

    /// Insert all grids of a batch at once
    fn create_grids(&mut self, group_id: &str, grids: Vec<NewGrid>) -> Result<Vec<Grid>>;

    /// Delete a group and every grid in it
    fn delete_grid_group(&mut self, group_id: &str) -> Result<()>;
}

/// In-memory store persisted as a single JSON document
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Catalog {
    pub games: Vec<GameConfig>,
    pub images: Vec<BingoImage>,
    pub grid_groups: Vec<GridGroup>,
    pub grids: Vec<Grid>,
    pub sessions: Vec<DrawSession>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| BingoError::Config(format!("Failed to parse catalog: {}", e)))
    }

    /// Load a catalog, or start an empty one if the file does not exist yet
    #[cfg(feature = "serde")]
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await? {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Save the catalog to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BingoError::Config(format!("Failed to serialize catalog: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn add_game(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        if self.games.iter().any(|g| g.id == config.id) {
            return Err(BingoError::Config(format!(
                "game '{}' already exists",
                config.id
            )));
        }
        self.games.push(config);
        Ok(())
    }

    pub fn game_mut(&mut self, game_id: &str) -> Result<&mut GameConfig> {
        self.games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or_else(|| BingoError::UnknownGame(game_id.to_string()))
    }

    pub fn add_image(&mut self, image: BingoImage) -> Result<()> {
        self.ensure_game(&image.game_id)?;
        if self.images.iter().any(|i| i.id == image.id) {
            return Err(BingoError::Config(format!(
                "image '{}' already exists",
                image.id
            )));
        }
        self.images.push(image);
        Ok(())
    }

    /// Start a new draw session, deactivating the game's other sessions
    pub fn start_session(&mut self, game_id: &str, name: &str) -> Result<&mut DrawSession> {
        self.ensure_game(game_id)?;
        for session in self.sessions.iter_mut().filter(|s| s.game_id == game_id) {
            session.is_active = false;
        }
        self.sessions.push(DrawSession::new(new_id(), game_id, name));
        let index = self.sessions.len() - 1;
        Ok(&mut self.sessions[index])
    }

    pub fn active_session_mut(&mut self, game_id: &str) -> Option<&mut DrawSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.game_id == game_id && s.is_active)
    }

    fn ensure_game(&self, game_id: &str) -> Result<()> {
        if self.games.iter().any(|g| g.id == game_id) {
            Ok(())
        } else {
            Err(BingoError::UnknownGame(game_id.to_string()))
        }
    }
}

impl BingoStore for Catalog {
    fn get_game(&self, game_id: &str) -> Result<GameConfig> {
        self.games
            .iter()
            .find(|g| g.id == game_id)
            .cloned()
            .ok_or_else(|| BingoError::UnknownGame(game_id.to_string()))
    }

    fn list_images(&self, game_id: &str) -> Result<Vec<BingoImage>> {
        self.ensure_game(game_id)?;
        Ok(self
            .images
            .iter()
            .filter(|i| i.game_id == game_id)
            .cloned()
            .collect())
    }

    fn list_grid_groups(&self, game_id: &str) -> Result<Vec<GridGroup>> {
        self.ensure_game(game_id)?;
        Ok(self
            .grid_groups
            .iter()
            .filter(|g| g.game_id == game_id)
            .cloned()
            .collect())
    }

    fn list_grids(&self, group_id: &str) -> Result<Vec<Grid>> {
        if !self.grid_groups.iter().any(|g| g.id == group_id) {
            return Err(BingoError::UnknownGridGroup(group_id.to_string()));
        }
        Ok(self
            .grids
            .iter()
            .filter(|g| g.group_id == group_id)
            .cloned()
            .collect())
    }

    fn get_grids(&self, grid_ids: &[String]) -> Result<Vec<Grid>> {
        grid_ids
            .iter()
            .map(|id| {
                self.grids
                    .iter()
                    .find(|g| &g.id == id)
                    .cloned()
                    .ok_or_else(|| BingoError::UnknownGrid(id.clone()))
            })
            .collect()
    }

    fn create_grid_group(&mut self, game_id: &str, name: &str, size: usize) -> Result<GridGroup> {
        self.ensure_game(game_id)?;
        let group = GridGroup {
            id: new_id(),
            game_id: game_id.to_string(),
            name: name.to_string(),
            size,
        };
        self.grid_groups.push(group.clone());
        Ok(group)
    }

    fn create_grids(&mut self, group_id: &str, grids: Vec<NewGrid>) -> Result<Vec<Grid>> {
        let size = self
            .grid_groups
            .iter()
            .find(|g| g.id == group_id)
            .map(|g| g.size)
            .ok_or_else(|| BingoError::UnknownGridGroup(group_id.to_string()))?;

        if let Some(bad) = grids.iter().find(|g| g.cells.len() != size * size) {
            return Err(BingoError::Config(format!(
                "{} has {} cells, expected {}",
                bad.name,
                bad.cells.len(),
                size * size
            )));
        }

        let created: Vec<Grid> = grids
            .into_iter()
            .map(|grid| Grid {
                id: new_id(),
                group_id: group_id.to_string(),
                name: grid.name,
                cells: grid.cells,
            })
            .collect();
        self.grids.extend(created.iter().cloned());
        Ok(created)
    }

    fn delete_grid_group(&mut self, group_id: &str) -> Result<()> {
        let before = self.grid_groups.len();
        self.grid_groups.retain(|g| g.id != group_id);
        if self.grid_groups.len() == before {
            return Err(BingoError::UnknownGridGroup(group_id.to_string()));
        }
        self.grids.retain(|g| g.group_id != group_id);
        Ok(())
    }
}

/// Load an image pool from a CSV manifest with `id,name,source` columns.
///
/// A blank id gets a generated one. Rows with fewer than three columns are
/// skipped.
pub async fn import_images_csv(path: impl AsRef<Path>, game_id: &str) -> Result<Vec<BingoImage>> {
    let path = path.as_ref().to_owned();
    let game_id = game_id.to_string();

    let contents = tokio::fs::read_to_string(&path).await?;

    let images = tokio::task::spawn_blocking(move || {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(contents.as_bytes());
        let mut images = Vec::new();

        for result in reader.records() {
            let record = result?;
            if record.len() < 3 {
                continue;
            }
            let id = match record[0].trim() {
                "" => new_id(),
                id => id.to_string(),
            };
            images.push(BingoImage {
                id,
                game_id: game_id.clone(),
                name: record[1].trim().to_string(),
                source: SourceRef::new(record[2].trim()),
            });
        }
        Ok::<_, BingoError>(images)
    })
    .await??;

    log::info!("Loaded {} images from {}", images.len(), path.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_game(GameConfig::new("game", "Party")).unwrap();
        catalog
    }

    fn new_grid(name: &str, cells: usize) -> NewGrid {
        NewGrid {
            name: name.to_string(),
            cells: vec![Cell::Image("a".to_string()); cells],
        }
    }

    #[test]
    fn test_unknown_game() {
        let catalog = catalog();
        assert!(matches!(
            catalog.get_game("nope"),
            Err(BingoError::UnknownGame(_))
        ));
        assert!(matches!(
            catalog.list_images("nope"),
            Err(BingoError::UnknownGame(_))
        ));
    }

    #[test]
    fn test_delete_group_cascades() {
        let mut catalog = catalog();
        let keep = catalog.create_grid_group("game", "Keep", 3).unwrap();
        let drop = catalog.create_grid_group("game", "Drop", 3).unwrap();
        catalog
            .create_grids(&keep.id, vec![new_grid("Card 1", 9)])
            .unwrap();
        catalog
            .create_grids(&drop.id, vec![new_grid("Card 1", 9), new_grid("Card 2", 9)])
            .unwrap();

        catalog.delete_grid_group(&drop.id).unwrap();

        assert_eq!(catalog.grids.len(), 1);
        assert_eq!(catalog.list_grid_groups("game").unwrap(), vec![keep]);
        assert!(matches!(
            catalog.list_grids(&drop.id),
            Err(BingoError::UnknownGridGroup(_))
        ));
        assert!(catalog.delete_grid_group(&drop.id).is_err());
    }

    #[test]
    fn test_get_grids_keeps_requested_order() {
        let mut catalog = catalog();
        let group = catalog.create_grid_group("game", "Cards", 2).unwrap();
        let created = catalog
            .create_grids(&group.id, vec![new_grid("Card 1", 4), new_grid("Card 2", 4)])
            .unwrap();

        let ids = vec![created[1].id.clone(), created[0].id.clone()];
        let grids = catalog.get_grids(&ids).unwrap();
        assert_eq!(grids[0].name, "Card 2");
        assert_eq!(grids[1].name, "Card 1");

        let unknown = vec!["missing".to_string()];
        assert!(matches!(
            catalog.get_grids(&unknown),
            Err(BingoError::UnknownGrid(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_create_grids_checks_cell_count() {
        let mut catalog = catalog();
        let group = catalog.create_grid_group("game", "Cards", 3).unwrap();
        let result = catalog.create_grids(&group.id, vec![new_grid("Card 1", 8)]);
        assert!(matches!(result, Err(BingoError::Config(_))));
        assert!(catalog.grids.is_empty());
    }

    #[test]
    fn test_new_session_deactivates_others() {
        let mut catalog = catalog();
        let first = catalog.start_session("game", "Round 1").unwrap().id.clone();
        let second = catalog.start_session("game", "Round 2").unwrap().id.clone();

        assert_ne!(first, second);
        assert_eq!(catalog.active_session_mut("game").unwrap().id, second);
        assert_eq!(catalog.sessions.iter().filter(|s| s.is_active).count(), 1);
    }

    #[test]
    fn test_duplicate_image_is_rejected() {
        let mut catalog = catalog();
        let image = BingoImage {
            id: "img-1".to_string(),
            game_id: "game".to_string(),
            name: "Alice".to_string(),
            source: SourceRef::new("photos/alice.jpg"),
        };

        catalog.add_image(image.clone()).unwrap();
        assert!(matches!(
            catalog.add_image(image),
            Err(BingoError::Config(_))
        ));
        assert_eq!(catalog.list_images("game").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.csv");
        std::fs::write(
            &path,
            "id,name,source\nimg-1,Alice,photos/alice.jpg\n,Bob,photos/bob.jpg\nbroken\n",
        )
        .unwrap();

        let images = import_images_csv(&path, "game").await.unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].id, "img-1");
        assert_eq!(images[0].source.as_str(), "photos/alice.jpg");
        assert!(!images[1].id.is_empty());
        assert!(images.iter().all(|i| i.game_id == "game"));
    }

    #[cfg(feature = "serde")]
    #[tokio::test]
    async fn test_catalog_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = catalog();
        catalog
            .add_image(BingoImage {
                id: "img-1".to_string(),
                game_id: "game".to_string(),
                name: "Alice".to_string(),
                source: SourceRef::new("photos/alice.jpg"),
            })
            .unwrap();
        catalog.save(&path).await.unwrap();

        assert_eq!(Catalog::load(&path).await.unwrap(), catalog);
        let fresh = Catalog::load_or_default(dir.path().join("missing.json"))
            .await
            .unwrap();
        assert!(fresh.games.is_empty());
    }
}
