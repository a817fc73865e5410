//! API paths and headers for the Ops Manager public API and the Atlas admin API

/// Ops Manager / Cloud Manager public API
pub const PUBLIC_API_PATH: &str = "/api/public/v1.0";

/// Atlas administration API
pub const ATLAS_API_PATH: &str = "/api/atlas/v2";

/// Page size requested from paginated list endpoints
pub const ITEMS_PER_PAGE: usize = 500;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const USER_AGENT: &str = concat!("janus/", env!("CARGO_PKG_VERSION"));

pub mod headers {
    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Versioned media type the Atlas v2 API requires
    pub const ATLAS_ACCEPT: &str = "application/vnd.atlas.2023-02-01+json";
}

pub mod status {
    pub const CREATED: u16 = 201;
    pub const ACCEPTED: u16 = 202;
    pub const CONFLICT: u16 = 409;
}

fn group(base_url: &str, api_path: &str, group_id: &str) -> String {
    format!(
        "{}{}/groups/{}",
        base_url.trim_end_matches('/'),
        api_path,
        urlencoding::encode(group_id)
    )
}

/// `GET /groups`
pub fn projects_endpoint(base_url: &str) -> String {
    format!("{}{}/groups", base_url.trim_end_matches('/'), PUBLIC_API_PATH)
}

/// `GET`/`POST /groups/{id}/alertConfigs`
pub fn alert_configs_endpoint(base_url: &str, group_id: &str) -> String {
    format!("{}/alertConfigs", group(base_url, PUBLIC_API_PATH, group_id))
}

/// `GET /groups/{id}/automationConfig`
pub fn automation_config_endpoint(base_url: &str, group_id: &str) -> String {
    format!("{}/automationConfig", group(base_url, PUBLIC_API_PATH, group_id))
}

/// `GET`/`POST /groups/{id}/customDBRoles/roles` on Atlas
pub fn custom_roles_endpoint(base_url: &str, group_id: &str) -> String {
    format!("{}/customDBRoles/roles", group(base_url, ATLAS_API_PATH, group_id))
}

/// `GET`/`POST /groups/{id}/databaseUsers` on Atlas
pub fn database_users_endpoint(base_url: &str, group_id: &str) -> String {
    format!("{}/databaseUsers", group(base_url, ATLAS_API_PATH, group_id))
}

/// Append page parameters to a list endpoint
pub fn paged(url: &str, page_num: usize) -> String {
    format!("{}?pageNum={}&itemsPerPage={}", url, page_num, ITEMS_PER_PAGE)
}
