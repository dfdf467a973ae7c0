//! Identity and geometry types shared by every Meridian crate.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// One backend microservice the client talks to once it is in-world.
///
/// The set is fixed at compile time: there is no way to register a new
/// service at runtime, and each variant owns a well-known port. This makes
/// `Service` a perfect `HashMap` key: it's `Copy` and hashes cheaply.
///
/// Serialized as its kebab-case name (`"world-engine"`), which is also what
/// [`Service::name`] returns and what shows up in logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    /// Generates and streams procedural music ("songweaving").
    SongEngine,
    /// Serves terrain and object data per grid cell.
    WorldEngine,
    /// Computes the harmonic field at a point in space.
    HarmonyService,
    /// Tracks which agents are near a position.
    PresenceService,
    /// Resolves asset manifests (meshes, textures, sounds).
    AssetService,
}

impl Service {
    /// Every service, in a stable order.
    pub const ALL: [Service; 5] = [
        Service::SongEngine,
        Service::WorldEngine,
        Service::HarmonyService,
        Service::PresenceService,
        Service::AssetService,
    ];

    /// Machine-friendly name, identical to the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Self::SongEngine => "song-engine",
            Self::WorldEngine => "world-engine",
            Self::HarmonyService => "harmony-service",
            Self::PresenceService => "presence-service",
            Self::AssetService => "asset-service",
        }
    }

    /// The TCP port the service listens on by default.
    pub fn port(self) -> u16 {
        match self {
            Self::SongEngine => 8001,
            Self::WorldEngine => 8002,
            Self::HarmonyService => 8003,
            Self::PresenceService => 8004,
            Self::AssetService => 8005,
        }
    }

    /// Human-readable label for status screens.
    pub fn label(self) -> &'static str {
        match self {
            Self::SongEngine => "Song Engine",
            Self::WorldEngine => "World Engine",
            Self::HarmonyService => "Harmony Service",
            Self::PresenceService => "Presence Service",
            Self::AssetService => "Asset Service",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// GridInfo
// ---------------------------------------------------------------------------

/// A virtual-world deployment ("grid") the user can log into.
///
/// Two grids are the same grid if they share a login URI; the display
/// name and short identifier are cosmetic and may be edited by the user.
/// That's why `PartialEq` and `Hash` are implemented by hand below instead
/// of derived: deriving would compare every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridInfo {
    /// Display name, e.g. "OSGrid".
    pub name: String,
    /// The login endpoint, e.g. `http://login.osgrid.org/`.
    pub login_uri: String,
    /// Short, stable identifier, e.g. `osgrid`. Used to key stored
    /// credentials.
    pub short_id: String,
}

impl GridInfo {
    /// Creates a new grid description.
    pub fn new(
        name: impl Into<String>,
        login_uri: impl Into<String>,
        short_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            login_uri: login_uri.into(),
            short_id: short_id.into(),
        }
    }
}

impl PartialEq for GridInfo {
    fn eq(&self, other: &Self) -> bool {
        self.login_uri == other.login_uri
    }
}

impl Eq for GridInfo {}

impl Hash for GridInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.login_uri.hash(state);
    }
}

impl fmt::Display for GridInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.short_id)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// An integer cell on the world grid. World data is served per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldCoord {
    pub x: i32,
    pub z: i32,
}

impl WorldCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for WorldCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // =====================================================================
    // Service
    // =====================================================================

    #[test]
    fn test_service_ports_are_unique() {
        let ports: HashSet<u16> = Service::ALL.iter().map(|s| s.port()).collect();
        assert_eq!(ports.len(), Service::ALL.len());
    }

    #[test]
    fn test_service_serializes_as_name() {
        let json = serde_json::to_string(&Service::WorldEngine).unwrap();
        assert_eq!(json, r#""world-engine""#);
        for service in Service::ALL {
            let json = serde_json::to_string(&service).unwrap();
            assert_eq!(json, format!("\"{}\"", service.name()));
        }
    }

    #[test]
    fn test_service_display_uses_name() {
        assert_eq!(Service::HarmonyService.to_string(), "harmony-service");
        assert_eq!(Service::HarmonyService.label(), "Harmony Service");
    }

    // =====================================================================
    // GridInfo
    // =====================================================================

    #[test]
    fn test_grid_equality_uses_login_uri_only() {
        let a = GridInfo::new("OSGrid", "http://login.osgrid.org/", "osgrid");
        let b = GridInfo::new("My OSGrid", "http://login.osgrid.org/", "os");
        let c = GridInfo::new("OSGrid", "http://other.example/", "osgrid");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_grid_hash_matches_equality() {
        let mut set = HashSet::new();
        set.insert(GridInfo::new("A", "http://a.example/", "a"));
        set.insert(GridInfo::new("A renamed", "http://a.example/", "a2"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_grid_display() {
        let g = GridInfo::new("Kitely", "https://grid.kitely.com:8002/", "kitely");
        assert_eq!(g.to_string(), "Kitely (kitely)");
    }

    #[test]
    fn test_world_coord_display() {
        assert_eq!(WorldCoord::new(3, -7).to_string(), "(3, -7)");
    }
}
