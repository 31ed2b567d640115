use lamp_schema::HostClass;
use std::path::Path;
use tracing::debug;

const DMI_FILES: &[&str] = &[
    "/sys/class/dmi/id/product_name",
    "/sys/class/dmi/id/board_name",
    "/sys/class/dmi/id/board_vendor",
];

/// Classify a machine from its OS name and DMI identification strings.
pub fn classify_host(os: &str, dmi: &[String]) -> HostClass {
    if os == "macos" {
        return HostClass::MacosDev;
    }
    if dmi.iter().any(|s| s.to_ascii_uppercase().contains("NUC")) {
        return HostClass::Nuc;
    }
    HostClass::GenericX86
}

/// Best-effort host class of the machine lamp is running on.
pub fn detect_host_class() -> HostClass {
    let dmi: Vec<String> = DMI_FILES
        .iter()
        .map(Path::new)
        .filter_map(|p| std::fs::read_to_string(p).ok())
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();
    let class = classify_host(std::env::consts::OS, &dmi);
    debug!("detected host class {class} from dmi {dmi:?}");
    class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macos_is_dev_host() {
        assert_eq!(classify_host("macos", &[]), HostClass::MacosDev);
        assert_eq!(
            classify_host("macos", &["NUC8i7BEH".to_owned()]),
            HostClass::MacosDev
        );
    }

    #[test]
    fn nuc_detected_from_dmi() {
        assert_eq!(
            classify_host("linux", &["Intel(R) Client Systems".to_owned(), "NUC11PAHi7".to_owned()]),
            HostClass::Nuc
        );
        assert_eq!(classify_host("linux", &["nuc".to_owned()]), HostClass::Nuc);
    }

    #[test]
    fn other_linux_is_generic() {
        assert_eq!(
            classify_host("linux", &["ThinkPad X1".to_owned()]),
            HostClass::GenericX86
        );
        assert_eq!(classify_host("linux", &[]), HostClass::GenericX86);
    }

    #[test]
    fn detect_does_not_panic() {
        let _ = detect_host_class();
    }
}
