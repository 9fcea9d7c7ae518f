pub mod routes {
    pub const HEALTH: &str = "/health";

    pub const BASE: &str = "/godot-delivery";
    pub const ADD_REPOSITORY: &str = "/godot-delivery/add-repository";
    pub const NEXT_GAME: &str = "/godot-delivery/next-game";
    pub const DOWNLOAD: &str = "/godot-delivery/download";
}

pub mod files {
    /// Directory below the storage root holding the exported packages.
    pub const PCKS_DIR: &str = "pcks";
    /// Persisted platform -> package list mapping, below the storage root.
    pub const CACHE_FILE: &str = "cache.json";

    /// Engine project settings inside a fetched repository.
    pub const PROJECT_FILE: &str = "project.godot";
    /// Export preset declarations inside a fetched repository.
    pub const EXPORT_PRESETS_FILE: &str = "export_presets.cfg";
    /// Temporary artifact path inside the workspace, reused by every preset.
    pub const EXPORT_ARTIFACT: &str = "export.pck";
    /// Marker of a managed (C#) sub-project.
    pub const MANAGED_PROJECT_EXTENSION: &str = "csproj";

    pub const PACKAGE_EXTENSION: &str = "pck";
}

pub mod credentials {
    /// The only user allowed to submit repositories.
    pub const MANAGER_USER: &str = "manager";
}

/// Platforms accepted by `next-game` unless configured otherwise.
pub const DEFAULT_PLATFORMS: &[&str] = &["linuxx11", "windowsdesktop"];
