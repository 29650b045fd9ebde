pub mod apps {

    pub const CONTACTS: &str = "contacts";

    pub const CALENDAR: &str = "calendar";

    pub const TASKS: &str = "tasks";
}

pub mod limits {

    pub const DEFAULT_SEARCH_LIMIT: u64 = 5;

    pub const MAX_SEARCH_LIMIT: u64 = 50;
}

pub mod components {

    pub const VEVENT: &str = "VEVENT";

    pub const VTODO: &str = "VTODO";
}

pub mod jobs {

    /// Offset added to the last day's midnight to get the end-of-absence
    /// instant. Intentionally 23h59m, not 23:59:59.
    pub const END_OF_DAY_MINUTES: i64 = 23 * 60 + 59;
}
