use std::sync::Arc;

use super::Session;
use crate::domain::Domain;
use crate::marshal::MarshalFactory;
use crate::session_id::SessionIdAllocator;
use crate::transport::TcpMarshalFactory;

/// Builds a [`Session`] with a custom marshal factory or id allocator.
///
/// Without an explicit allocator the session takes its id from
/// [`SessionIdAllocator::global`].
#[derive(Debug, Clone)]
pub struct SessionBuilder<F = TcpMarshalFactory> {
	domain: Domain,
	factory: F,
	allocator: Option<Arc<SessionIdAllocator>>,
}

impl SessionBuilder {
	pub fn new(domain: &Domain) -> Self {
		Self {
			domain: domain.clone(),
			factory: TcpMarshalFactory::default(),
			allocator: None,
		}
	}
}

impl<F: MarshalFactory> SessionBuilder<F> {
	pub fn factory<G: MarshalFactory>(self, factory: G) -> SessionBuilder<G> {
		SessionBuilder {
			domain: self.domain,
			factory,
			allocator: self.allocator,
		}
	}

	pub fn allocator(mut self, allocator: Arc<SessionIdAllocator>) -> Self {
		self.allocator = Some(allocator);
		self
	}

	pub fn build(self) -> Session<F> {
		let local_id = match &self.allocator {
			Some(allocator) => allocator.next(),
			None => SessionIdAllocator::global().next(),
		};
		Session::from_parts(local_id, self.domain, self.factory)
	}
}
