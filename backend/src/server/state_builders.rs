//! Builders turning a [`Backend`] into the port implementations.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use fictures::domain::demo_posts;
use fictures::domain::ports::{AuthProvider, PostRepository};
use fictures::inbound::http::state::HttpStatePorts;
use fictures::outbound::hosted::{HostedAuthProvider, HostedClient, HostedPostRepository};
use fictures::outbound::memory::{InMemoryAuthProvider, InMemoryPostRepository};

use super::config::Backend;

/// Build the ports for `backend`.
///
/// # Errors
/// Returns an I/O error when the hosted client cannot be built or the demo
/// posts fail validation.
pub fn build_ports(backend: Backend) -> std::io::Result<HttpStatePorts> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (posts, auth): (Arc<dyn PostRepository>, Arc<dyn AuthProvider>) = match backend {
        Backend::Hosted(config) => {
            info!(base_url = %config.base_url, table = %config.posts_table, "using hosted backend");
            let client = HostedClient::new(config).map_err(std::io::Error::other)?;
            (
                Arc::new(HostedPostRepository::new(client.clone())),
                Arc::new(HostedAuthProvider::new(client)),
            )
        }
        Backend::InMemory { seed_demo } => {
            let posts = if seed_demo {
                let seeded = demo_posts(clock.utc()).map_err(std::io::Error::other)?;
                info!(count = seeded.len(), "seeded in-memory store with demo posts");
                InMemoryPostRepository::with_posts(seeded)
            } else {
                InMemoryPostRepository::default()
            };
            info!("using in-memory backend; data is lost on restart");
            (Arc::new(posts), Arc::new(InMemoryAuthProvider::default()))
        }
    };
    Ok(HttpStatePorts { posts, auth, clock })
}
