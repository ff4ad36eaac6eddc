//! Framework classification labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The framework (or native toolkit) a package was built with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AppKind {
    /// Flutter (Dart) application.
    Flutter,
    /// React Native (JavaScript) application.
    ReactNative,
    /// Xamarin / .NET MAUI application.
    Xamarin,
    /// Cordova / PhoneGap webview application.
    Cordova,
    /// Ionic / Capacitor webview application.
    Ionic,
    /// Unity game engine application.
    Unity,
    /// Kotlin Multiplatform application.
    Kmp,
    /// Plain native Android application.
    Native,
    /// Archive could not be inspected.
    Unknown,
}

impl AppKind {
    /// Classification precedence, strongest framework evidence first.
    ///
    /// Ionic precedes Cordova because Capacitor packages also carry
    /// `www/`-shaped content that matches the Cordova markers.
    pub const PRECEDENCE: [AppKind; 8] = [
        AppKind::Flutter,
        AppKind::ReactNative,
        AppKind::Xamarin,
        AppKind::Ionic,
        AppKind::Cordova,
        AppKind::Unity,
        AppKind::Kmp,
        AppKind::Native,
    ];

    /// Whether this kind represents a cross-platform framework
    /// (as opposed to native, or an uninspectable archive).
    pub fn is_framework(&self) -> bool {
        !matches!(self, AppKind::Native | AppKind::Unknown)
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flutter => write!(f, "Flutter"),
            Self::ReactNative => write!(f, "React Native"),
            Self::Xamarin => write!(f, "Xamarin"),
            Self::Cordova => write!(f, "Cordova/PhoneGap"),
            Self::Ionic => write!(f, "Ionic/Capacitor"),
            Self::Unity => write!(f, "Unity"),
            Self::Kmp => write!(f, "Kotlin Multiplatform"),
            Self::Native => write!(f, "Native Android"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for AppKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flutter" => Ok(Self::Flutter),
            "react-native" | "reactnative" | "react native" => Ok(Self::ReactNative),
            "xamarin" | "maui" => Ok(Self::Xamarin),
            "cordova" | "phonegap" => Ok(Self::Cordova),
            "ionic" | "capacitor" => Ok(Self::Ionic),
            "unity" => Ok(Self::Unity),
            "kmp" | "kotlin-multiplatform" => Ok(Self::Kmp),
            "native" | "native-android" => Ok(Self::Native),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("unknown app kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(AppKind::Flutter.to_string(), "Flutter");
        assert_eq!(AppKind::ReactNative.to_string(), "React Native");
        assert_eq!(AppKind::Native.to_string(), "Native Android");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("flutter".parse::<AppKind>().unwrap(), AppKind::Flutter);
        assert_eq!("react-native".parse::<AppKind>().unwrap(), AppKind::ReactNative);
        assert_eq!("phonegap".parse::<AppKind>().unwrap(), AppKind::Cordova);
        assert!("vaporware".parse::<AppKind>().is_err());
    }

    #[test]
    fn test_precedence_excludes_unknown() {
        assert!(!AppKind::PRECEDENCE.contains(&AppKind::Unknown));
        assert_eq!(AppKind::PRECEDENCE.last(), Some(&AppKind::Native));
    }

    #[test]
    fn test_serde_kebab_case() {
        let json = serde_json::to_string(&AppKind::ReactNative).unwrap();
        assert_eq!(json, "\"react-native\"");
        let parsed: AppKind = serde_json::from_str("\"kmp\"").unwrap();
        assert_eq!(parsed, AppKind::Kmp);
    }
}
