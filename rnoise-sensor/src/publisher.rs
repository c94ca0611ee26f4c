use anyhow::Result;

use crate::point_cloud::PointCloudMsg;

/// Output channel for filtered clouds.
pub trait Publisher {
    fn publish(&mut self, msg: PointCloudMsg) -> Result<()>;
}

/// Keeps every published message in memory, in publish order.
#[derive(Debug, Default)]
pub struct CollectingPublisher {
    pub topic: String,
    pub messages: Vec<PointCloudMsg>,
}

impl CollectingPublisher {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            messages: Vec::new(),
        }
    }

    pub fn number_of_points(&self) -> usize {
        self.messages.iter().map(|m| m.number_of_points()).sum()
    }
}

impl Publisher for CollectingPublisher {
    fn publish(&mut self, msg: PointCloudMsg) -> Result<()> {
        log::trace!(
            "{}: {} points in {}",
            self.topic,
            msg.number_of_points(),
            msg.header.frame_id
        );
        self.messages.push(msg);
        Ok(())
    }
}
