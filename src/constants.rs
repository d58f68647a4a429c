/// Placeholder avatar assigned to every freshly registered profile.
pub const DEFAULT_PROFILE_PIC_URL: &str =
    "https://ik.imagekit.io/guildpost/avatars/placeholder.png";

/// Separator for the `home_content.requirements` text column.
pub const REQUIREMENTS_SEPARATOR: char = ';';

pub mod limits {

    /// Maximum rows returned by the member search endpoint.
    pub const MAX_SEARCH_RESULTS: u64 = 10;

    /// Queries shorter than this return an empty result instead of scanning.
    pub const MIN_SEARCH_QUERY_LEN: usize = 2;
}
