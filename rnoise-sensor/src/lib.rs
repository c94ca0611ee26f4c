pub mod point_cloud;
pub mod publisher;

pub use point_cloud::{PointCloudMsg, PointField, PointFieldType};
pub use publisher::{CollectingPublisher, Publisher};
