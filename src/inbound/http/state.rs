//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::domain::ports::{CourseRepository, EnrollmentRepository, StudentRepository};
use crate::domain::{
    CatalogService, EnrollmentService, IdentityService, ProvisioningService, TokenIssuer,
};

/// Services and the token issuer, cloned into every worker.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<IdentityService>,
    pub provisioning: Arc<ProvisioningService>,
    pub catalog: Arc<CatalogService>,
    pub enrollments: Arc<EnrollmentService>,
    pub tokens: Arc<TokenIssuer>,
}

impl HttpState {
    /// Wire the services over their repositories.
    pub fn new(
        students: Arc<dyn StudentRepository>,
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            identity: Arc::new(IdentityService::new(Arc::clone(&students))),
            provisioning: Arc::new(ProvisioningService::new(students)),
            catalog: Arc::new(CatalogService::new(courses)),
            enrollments: Arc::new(EnrollmentService::new(enrollments)),
            tokens: Arc::new(tokens),
        }
    }
}
