//! Display units for memory figures.

use crate::utils::config::PAGE_SIZE_KB;

/// Unit used when a report shows scaled memory instead of raw Kbytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unit {
    #[default]
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Kilobytes => "kB",
            Unit::Megabytes => "MB",
            Unit::Gigabytes => "GB",
        }
    }

    /// Scale a page count into this unit.
    pub fn scale(&self, pages: u64) -> f64 {
        let kb = (pages * PAGE_SIZE_KB) as f64;
        match self {
            Unit::Kilobytes => kb,
            Unit::Megabytes => kb / 1024.0,
            Unit::Gigabytes => kb / (1024.0 * 1024.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilobytes_is_pages_times_four() {
        assert_eq!(Unit::Kilobytes.scale(3), 12.0);
    }

    #[test]
    fn test_megabytes() {
        // 512 pages = 2048 kB = 2 MB
        assert_eq!(Unit::Megabytes.scale(512), 2.0);
    }

    #[test]
    fn test_gigabytes() {
        // 262144 pages = 1 GiB
        assert_eq!(Unit::Gigabytes.scale(262_144), 1.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Unit::Kilobytes.label(), "kB");
        assert_eq!(Unit::Megabytes.label(), "MB");
        assert_eq!(Unit::Gigabytes.label(), "GB");
    }
}
