use crate::models::MonitorInfo;
use crate::satellite::{ImageVariant, SatelliteConfig, ViewConfig};

/// One target image for one connected monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub monitor: String,
    pub url: String,
}

/// Compute the desired wallpaper assignment: one image url per
/// connected monitor for the given view. Pure; zero monitors simply
/// yields zero assignments. Returns `None` when the payload has no
/// views at all.
pub fn assign_wallpapers(
    config: &SatelliteConfig,
    view_id: &str,
    monitors: &[MonitorInfo],
) -> Option<Vec<Assignment>> {
    let view = config.resolve_view(view_id)?;
    Some(
        monitors
            .iter()
            .filter_map(|m| {
                pick_variant(view, m).map(|v| Assignment {
                    monitor: m.name.clone(),
                    url: v.url.clone(),
                })
            })
            .collect(),
    )
}

/// Smallest variant that covers the monitor's pixel size, else the
/// largest available.
fn pick_variant<'a>(view: &'a ViewConfig, monitor: &MonitorInfo) -> Option<&'a ImageVariant> {
    let need_w = (monitor.width as f64 * monitor.scale).round() as u32;
    let need_h = (monitor.height as f64 * monitor.scale).round() as u32;

    view.variants
        .iter()
        .filter(|v| v.width >= need_w && v.height >= need_h)
        .min_by_key(|v| (v.width, v.height))
        .or_else(|| view.variants.iter().max_by_key(|v| (v.width, v.height)))
}
