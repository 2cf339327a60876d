//! Files the ETL knows how to import

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
pub enum SupportedFile {
    /// Open-air fairs of São Paulo, 2014 release
    #[value(name = "fairs-2014", alias = "DEINFO_AB_FEIRASLIVRES_2014.csv")]
    Fairs2014,
}

impl SupportedFile {
    pub const ALL: [SupportedFile; 1] = [SupportedFile::Fairs2014];

    /// Name of the entry inside the published archive
    pub fn file_name(self) -> &'static str {
        match self {
            SupportedFile::Fairs2014 => "DEINFO_AB_FEIRASLIVRES_2014.csv",
        }
    }
}

impl fmt::Display for SupportedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_archive_entry_name() {
        assert_eq!(
            SupportedFile::Fairs2014.to_string(),
            "DEINFO_AB_FEIRASLIVRES_2014.csv"
        );
    }

    #[test]
    fn test_unknown_cli_value_is_rejected() {
        assert!(SupportedFile::from_str("DEINFO_AB_FEIRASLIVRES_2015.csv", false).is_err());
    }

    #[test]
    fn test_cli_value_accepts_name_and_file_name() {
        assert_eq!(
            SupportedFile::from_str("fairs-2014", false).unwrap(),
            SupportedFile::Fairs2014
        );
        assert_eq!(
            SupportedFile::from_str("DEINFO_AB_FEIRASLIVRES_2014.csv", false).unwrap(),
            SupportedFile::Fairs2014
        );
    }
}
