//! Per-framework detector implementations.
//!
//! Each detector is a unit struct carrying its marker table as a const.
//! Markers are path fragments that only the framework's build tooling
//! emits into an APK.

use super::{FrameworkDetector, LibraryHit};
use crate::types::AppKind;

/// All registered detectors, in no particular order; classification
/// precedence is applied over the accumulated evidence, not here.
static DETECTORS: [&dyn FrameworkDetector; 7] = [
    &FlutterDetector,
    &ReactNativeDetector,
    &XamarinDetector,
    &CordovaDetector,
    &IonicDetector,
    &UnityDetector,
    &KmpDetector,
];

/// The detector registry.
pub fn detectors() -> &'static [&'static dyn FrameworkDetector] {
    &DETECTORS
}

/// Flutter: Dart snapshots and the engine shared library.
pub struct FlutterDetector;

impl FlutterDetector {
    const MARKERS: [&'static str; 4] = [
        "flutter_assets",
        "libflutter.so",
        "isolate_snapshot_data",
        "kernel_blob.bin",
    ];

    /// Dart package asset roots recognizable in the archive.
    const PACKAGES: [(&'static str, &'static str); 17] = [
        ("http", "packages/http/"),
        ("shared_preferences", "packages/shared_preferences/"),
        ("path_provider", "packages/path_provider/"),
        ("sqflite", "packages/sqflite/"),
        ("camera", "packages/camera/"),
        ("image_picker", "packages/image_picker/"),
        ("url_launcher", "packages/url_launcher/"),
        ("webview_flutter", "packages/webview_flutter/"),
        ("firebase_core", "packages/firebase_core/"),
        ("firebase_auth", "packages/firebase_auth/"),
        ("cloud_firestore", "packages/cloud_firestore/"),
        ("provider", "packages/provider/"),
        ("bloc", "packages/bloc/"),
        ("dio", "packages/dio/"),
        ("get", "packages/get/"),
        ("flutter_riverpod", "packages/flutter_riverpod/"),
        ("go_router", "packages/go_router/"),
    ];
}

impl FrameworkDetector for FlutterDetector {
    fn kind(&self) -> AppKind {
        AppKind::Flutter
    }

    fn markers(&self) -> &'static [&'static str] {
        &Self::MARKERS
    }

    fn library_hit(&self, entry: &str) -> Option<LibraryHit> {
        // Package assets land under assets/flutter_assets/packages/<pkg>/.
        if !entry.contains("assets/") {
            return None;
        }
        Self::PACKAGES
            .iter()
            .find(|(_, pattern)| entry.contains(pattern))
            .map(|(name, _)| LibraryHit::new(*name, entry))
    }
}

/// React Native: JS bundles and the JSI/Hermes runtimes.
pub struct ReactNativeDetector;

impl ReactNativeDetector {
    const MARKERS: [&'static str; 4] = [
        "assets/index.android.bundle",
        "libreactnativejni.so",
        "libhermes.so",
        "assets/index.bundle",
    ];

    /// Well-known community packages and the patterns they leave behind.
    const PACKAGES: [(&'static str, &'static str); 18] = [
        ("react-navigation", "react-navigation"),
        ("react-redux", "react-redux"),
        ("redux-toolkit", "@reduxjs/toolkit"),
        ("react-native-vector-icons", "react-native-vector-icons"),
        ("react-native-gesture-handler", "react-native-gesture-handler"),
        ("react-native-reanimated", "react-native-reanimated"),
        ("react-native-screens", "react-native-screens"),
        ("react-native-safe-area-context", "react-native-safe-area-context"),
        ("react-native-async-storage", "@react-native-async-storage"),
        ("react-native-camera", "react-native-camera"),
        ("react-native-image-picker", "react-native-image-picker"),
        ("react-native-webview", "react-native-webview"),
        ("react-native-maps", "react-native-maps"),
        ("react-native-firebase", "@react-native-firebase"),
        ("react-native-push-notification", "react-native-push-notification"),
        ("react-native-linear-gradient", "react-native-linear-gradient"),
        ("react-native-svg", "react-native-svg"),
        ("lottie-react-native", "lottie-react-native"),
    ];
}

impl FrameworkDetector for ReactNativeDetector {
    fn kind(&self) -> AppKind {
        AppKind::ReactNative
    }

    fn markers(&self) -> &'static [&'static str] {
        &Self::MARKERS
    }

    fn library_hit(&self, entry: &str) -> Option<LibraryHit> {
        // Asset and node_modules-shaped paths keep the package name intact.
        if entry.contains("assets/") || entry.contains("node_modules/") {
            if let Some((name, _)) = Self::PACKAGES
                .iter()
                .find(|(_, pattern)| entry.contains(pattern))
            {
                return Some(LibraryHit::new(*name, entry));
            }
        }

        // Native modules compile to .so files with the dashes squeezed out
        // (libreactnativecamera.so and the like).
        if entry.starts_with("lib/") && entry.ends_with(".so") {
            let so_name = entry.rsplit('/').next().unwrap_or(entry);
            let compact_so: String = so_name.chars().filter(|c| *c != '-' && *c != '_').collect();
            for (name, _) in &Self::PACKAGES {
                let compact: String =
                    name.chars().filter(|c| *c != '-' && *c != '_').collect();
                if compact_so.contains(&compact) {
                    return Some(LibraryHit::new(*name, entry));
                }
            }
        }

        None
    }
}

/// Xamarin / MAUI: Mono runtime and bundled .NET assemblies.
pub struct XamarinDetector;

impl XamarinDetector {
    const MARKERS: [&'static str; 3] = ["assemblies/", "libmonodroid.so", "libxamarin-app.so"];
}

impl FrameworkDetector for XamarinDetector {
    fn kind(&self) -> AppKind {
        AppKind::Xamarin
    }

    fn markers(&self) -> &'static [&'static str] {
        &Self::MARKERS
    }

    fn library_hit(&self, entry: &str) -> Option<LibraryHit> {
        // Every bundled assembly name is a library the app links against.
        let rest = entry.strip_prefix("assemblies/")?;
        let file = rest.rsplit('/').next()?;
        let stem = file.strip_suffix(".dll").or_else(|| file.strip_suffix(".dll.so"))?;
        if stem.is_empty() {
            return None;
        }
        Some(LibraryHit::new(stem, entry))
    }
}

/// Cordova / PhoneGap: webview app with a www/ payload.
pub struct CordovaDetector;

impl CordovaDetector {
    const MARKERS: [&'static str; 3] = ["assets/www/", "cordova.js", "phonegap.js"];

    const PLUGINS: [&'static str; 9] = [
        "cordova-plugin-camera",
        "cordova-plugin-file",
        "cordova-plugin-geolocation",
        "cordova-plugin-device",
        "cordova-plugin-network-information",
        "cordova-plugin-battery-status",
        "cordova-plugin-vibration",
        "cordova-plugin-statusbar",
        "cordova-plugin-splashscreen",
    ];
}

impl FrameworkDetector for CordovaDetector {
    fn kind(&self) -> AppKind {
        AppKind::Cordova
    }

    fn markers(&self) -> &'static [&'static str] {
        &Self::MARKERS
    }

    fn library_hit(&self, entry: &str) -> Option<LibraryHit> {
        if !entry.contains("assets/www/plugins/") {
            return None;
        }
        Self::PLUGINS
            .iter()
            .find(|plugin| entry.contains(*plugin))
            .map(|plugin| LibraryHit::new(*plugin, entry))
    }
}

/// Ionic / Capacitor: Cordova-shaped payload plus the Capacitor bridge.
pub struct IonicDetector;

impl IonicDetector {
    const MARKERS: [&'static str; 3] = [
        "capacitor.config.json",
        "assets/native-bridge.js",
        "www/lib/ionic/",
    ];
}

impl FrameworkDetector for IonicDetector {
    fn kind(&self) -> AppKind {
        AppKind::Ionic
    }

    fn markers(&self) -> &'static [&'static str] {
        &Self::MARKERS
    }
}

/// Unity: engine shared library and the Data/ payload.
pub struct UnityDetector;

impl UnityDetector {
    const MARKERS: [&'static str; 3] = ["libunity.so", "assets/bin/Data/", "libmono.so"];
}

impl FrameworkDetector for UnityDetector {
    fn kind(&self) -> AppKind {
        AppKind::Unity
    }

    fn markers(&self) -> &'static [&'static str] {
        &Self::MARKERS
    }

    fn library_hit(&self, entry: &str) -> Option<LibraryHit> {
        // Managed assemblies carry recognizable third-party names.
        let rest = entry.strip_prefix("assets/bin/Data/Managed/")?;
        let stem = rest.rsplit('/').next()?.strip_suffix(".dll")?;
        if stem.is_empty() {
            return None;
        }
        Some(LibraryHit::new(stem, entry))
    }
}

/// Kotlin Multiplatform: conservative, Compose Multiplatform resource root
/// only. KMP otherwise looks like a native app; its library surface is
/// covered by the cross-framework KMP table.
pub struct KmpDetector;

impl KmpDetector {
    const MARKERS: [&'static str; 1] = ["composeResources/"];
}

impl FrameworkDetector for KmpDetector {
    fn kind(&self) -> AppKind {
        AppKind::Kmp
    }

    fn markers(&self) -> &'static [&'static str] {
        &Self::MARKERS
    }
}
