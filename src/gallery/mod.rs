//! Project gallery catalogue and category filtering

use serde::{Deserialize, Serialize};

/// Project category, named after the car trims used on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Carrera,
    Targa,
    Turbo,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Carrera, Category::Targa, Category::Turbo];

    /// What kind of work the category holds
    pub fn description(&self) -> &'static str {
        match self {
            Category::Carrera => "Web Development",
            Category::Targa => "Backend Systems",
            Category::Turbo => "Research & ML",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Carrera => write!(f, "Carrera"),
            Category::Targa => write!(f, "Targa"),
            Category::Turbo => write!(f, "Turbo"),
        }
    }
}

/// Which cards the gallery shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl std::str::FromStr for CategoryFilter {
    type Err = CategoryError;

    /// Parse `all` or an exact category name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CategoryFilter::All),
            "Carrera" => Ok(CategoryFilter::Only(Category::Carrera)),
            "Targa" => Ok(CategoryFilter::Only(Category::Targa)),
            "Turbo" => Ok(CategoryFilter::Only(Category::Turbo)),
            other => Err(CategoryError::Unknown(other.to_string())),
        }
    }
}

impl CategoryFilter {
    /// Blurb shown on the filter tab
    pub fn description(&self) -> &'static str {
        match self {
            CategoryFilter::All => "View all work",
            CategoryFilter::Only(category) => category.description(),
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    #[error("unknown project category: {0}")]
    Unknown(String),
}

/// A project card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub link: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl Project {
    fn new(id: &str, title: &str, description: &str, category: Category, link: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category,
            link: link.to_string(),
            technologies: Vec::new(),
        }
    }
}

/// Ordered list of project cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Cards matching the filter, in catalogue order
    pub fn filter(&self, filter: CategoryFilter) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| match filter {
                CategoryFilter::All => true,
                CategoryFilter::Only(category) => p.category == category,
            })
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            Project::new(
                "playlistify",
                "Playlistify",
                "Web application that converts Spotify's liked songs into personalized playlists",
                Category::Carrera,
                "#",
            ),
            Project::new(
                "event-scheduler",
                "Event Scheduler",
                "Backend system with multi-user login for seamless appointment scheduling",
                Category::Targa,
                "#",
            ),
            Project::new(
                "drone-surveillance",
                "Remote Drone Surveillance",
                "ML system preventing security threats using drones and computer vision",
                Category::Turbo,
                "https://www.researchgate.net/publication/377547504",
            ),
            Project::new(
                "nerf",
                "Neural Radiance Fields",
                "Performance assessment of NeRF and Photogrammetry for 3D reconstruction",
                Category::Turbo,
                "https://www.researchgate.net/publication/378826735",
            ),
        ])
    }
}
