use std::sync::Arc;

use crate::{
    application::{moderation::service::ModerationService, queues::paginator::Paginator},
    config::Config,
    domain::comment::store::CommentStore,
    infrastructure::broker::EventBroker,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CommentStore>,
    pub broker: EventBroker,
    pub moderation: Arc<ModerationService>,
    pub paginator: Arc<Paginator>,
    pub config: Config,
}
