// Bibliothèque de la colonie minière d'astéroïdes
// Expose tous les modules pour utilisation externe (par le binaire et les tests)

pub mod types;          // Types de base (ResourceType, Position, états des drones)
pub mod error;          // Erreurs de configuration
pub mod config;         // Paramètres de construction (TOML)
pub mod grid;           // Grille bornée multi-occupants
pub mod deposit;        // Gisements d'astéroïdes
pub mod beacon;         // Balises de revendication
pub mod hazard;         // Radiations solaires
pub mod station;        // Station de traitement (file FIFO)
pub mod events;         // Journal des événements récents
pub mod field;          // Génération procédurale du champ de gisements
pub mod movement;       // Déplacement glouton évitant les dangers
pub mod scout;          // Drones éclaireurs
pub mod miner;          // Drones mineurs et allocation des balises
pub mod world;          // Monde et ordonnanceur
pub mod snapshot;       // Instantané sérialisable de l'état

// Ré-exportation des types principaux pour faciliter l'importation
pub use types::*;
pub use config::ColonyConfig;
pub use error::{ConfigError, Result};
pub use world::{TickStats, World};
pub use snapshot::{WorldSnapshot, create_world_snapshot};
