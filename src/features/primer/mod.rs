pub mod head_hints;
pub mod host;
pub mod http_loader;
pub mod resource_primer;

pub use head_hints::HeadHints;
pub use host::{
    HoverTarget, ImageLoader, IntersectionCallback, IntersectionEntry, ObserveControl,
    PointerEnterHandler, PrefetchDocument, PrefetchHint, VisibilityTarget,
};
pub use http_loader::HttpImageLoader;
pub use resource_primer::{CRITICAL_IMAGES, CRITICAL_ROUTES, ResourcePrimer, VISIBILITY_THRESHOLD};
