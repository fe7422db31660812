//! Find-or-create provisioning of students from external identity claims.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{StudentPersistenceError, StudentRepository};
use crate::domain::{ClaimSet, Error, Role, Student};

/// Claim types consulted for the account email, in resolution order.
const EMAIL_CLAIMS: &[&str] = &["email", "preferred_username"];

/// Fallback family name when no name claim resolves.
const FALLBACK_LAST_NAME: &str = "User";

fn resolve_names(claims: &ClaimSet, email: &str) -> (String, String) {
    let mut first = claims.first("given_name").map(str::to_owned);
    let mut last = claims.first("family_name").map(str::to_owned);

    // A single display-name claim splits on whitespace: first token is the
    // given name, the remainder joins into the family name.
    if first.is_none() || last.is_none() {
        if let Some(name) = claims.first("name") {
            let mut parts = name.split_whitespace();
            let head = parts.next().map(str::to_owned);
            let tail = parts.collect::<Vec<_>>().join(" ");
            first = first.or(head);
            if last.is_none() && !tail.is_empty() {
                last = Some(tail);
            }
        }
    }

    let first = first.unwrap_or_else(|| {
        email
            .split('@')
            .next()
            .unwrap_or(email)
            .to_owned()
    });
    let last = last.unwrap_or_else(|| FALLBACK_LAST_NAME.to_owned());
    (first, last)
}

fn resolve_role(claims: &ClaimSet) -> Role {
    if claims.has_role(Role::Admin) {
        Role::Admin
    } else {
        Role::Student
    }
}

/// Finds or creates a local student for an authenticated external identity.
///
/// Idempotent by email: repeated calls with the same email claim return
/// the same underlying record.
#[derive(Clone)]
pub struct ProvisioningService {
    students: Arc<dyn StudentRepository>,
}

impl ProvisioningService {
    /// Create the service over a student repository.
    pub fn new(students: Arc<dyn StudentRepository>) -> Self {
        Self { students }
    }

    /// Resolve the claim set to an existing student, or create one.
    ///
    /// Newly created accounts get an empty password hash: they can only
    /// authenticate through their identity provider.
    pub async fn provision(&self, claims: &ClaimSet) -> Result<Student, Error> {
        let Some(email) = claims.first_of(EMAIL_CLAIMS) else {
            warn!("cannot provision user: no email claim present");
            return Err(Error::invalid_request(
                "Could not provision user from authentication claims.",
            ));
        };

        if let Some(existing) = self.students.find_by_email(email).await.map_err(internal)? {
            return Ok(existing);
        }

        let (first_name, last_name) = resolve_names(claims, email);
        let student = Student {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            first_name,
            last_name,
            password_hash: String::new(),
            role: resolve_role(claims),
            created_at: Utc::now(),
        };

        match self.students.insert(&student).await {
            Ok(()) => {
                info!(email = %student.email, role = %student.role, "auto-provisioned student");
                Ok(student)
            }
            // Lost a provisioning race for the same email; the winner's
            // record is the canonical one.
            Err(StudentPersistenceError::DuplicateEmail { .. }) => self
                .students
                .find_by_email(email)
                .await
                .map_err(internal)?
                .ok_or_else(|| Error::internal("provisioned student vanished")),
            Err(other) => Err(internal(other)),
        }
    }
}

fn internal(error: StudentPersistenceError) -> Error {
    Error::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockStudentRepository;
    use crate::domain::test_fixtures::student_fixture;
    use rstest::rstest;

    fn service_creating(expected: impl Fn(&Student) -> bool + Send + 'static) -> ProvisioningService {
        let mut students = MockStudentRepository::new();
        students.expect_find_by_email().returning(|_| Ok(None));
        students
            .expect_insert()
            .withf(move |student| expected(student))
            .returning(|_| Ok(()));
        ProvisioningService::new(Arc::new(students))
    }

    #[tokio::test]
    async fn rejects_claims_without_email() {
        let service = ProvisioningService::new(Arc::new(MockStudentRepository::new()));
        let err = service
            .provision(&ClaimSet::new().with("name", "No Email"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn returns_existing_student_without_inserting() {
        let existing = student_fixture();
        let expected_id = existing.id;
        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        // No expect_insert: an insert call would panic the mock.

        let service = ProvisioningService::new(Arc::new(students));
        let claims = ClaimSet::new().with("email", "ada@example.com");
        let first = service.provision(&claims).await.expect("provision");
        let second = service.provision(&claims).await.expect("provision again");
        assert_eq!(first.id, expected_id);
        assert_eq!(second.id, expected_id);
    }

    #[tokio::test]
    async fn falls_back_to_preferred_username() {
        let service = service_creating(|s| s.email == "grace@navy.mil");
        let claims = ClaimSet::new().with("preferred_username", "grace@navy.mil");
        let student = service.provision(&claims).await.expect("provision");
        assert_eq!(student.email, "grace@navy.mil");
    }

    #[tokio::test]
    async fn splits_single_name_claim() {
        let service = service_creating(|s| {
            s.first_name == "Grace" && s.last_name == "Brewster Hopper"
        });
        let claims = ClaimSet::new()
            .with("email", "grace@navy.mil")
            .with("name", "Grace Brewster Hopper");
        service.provision(&claims).await.expect("provision");
    }

    #[tokio::test]
    async fn falls_back_to_email_local_part_and_user() {
        let service = service_creating(|s| s.first_name == "grace" && s.last_name == "User");
        let claims = ClaimSet::new().with("email", "grace@navy.mil");
        service.provision(&claims).await.expect("provision");
    }

    #[rstest]
    #[case("Student", Role::Student)]
    #[case("admin", Role::Admin)]
    #[case("Reader ADMIN Writer", Role::Admin)]
    #[case("administrator", Role::Student)]
    #[tokio::test]
    async fn resolves_role_from_space_separated_values(
        #[case] roles: &str,
        #[case] expected: Role,
    ) {
        let service = service_creating(move |s| s.role == expected);
        let claims = ClaimSet::new()
            .with("email", "grace@navy.mil")
            .with("roles", roles);
        service.provision(&claims).await.expect("provision");
    }

    #[tokio::test]
    async fn new_accounts_cannot_password_login() {
        let service = service_creating(|s| s.password_hash.is_empty());
        let claims = ClaimSet::new().with("email", "grace@navy.mil");
        service.provision(&claims).await.expect("provision");
    }

    #[tokio::test]
    async fn insert_race_resolves_to_winner() {
        let winner = student_fixture();
        let winner_id = winner.id;
        let mut students = MockStudentRepository::new();
        let mut lookups = 0u8;
        students.expect_find_by_email().returning(move |_| {
            lookups += 1;
            if lookups == 1 {
                Ok(None)
            } else {
                Ok(Some(winner.clone()))
            }
        });
        students.expect_insert().returning(|student| {
            Err(StudentPersistenceError::DuplicateEmail {
                email: student.email.clone(),
            })
        });

        let service = ProvisioningService::new(Arc::new(students));
        let claims = ClaimSet::new().with("email", "ada@example.com");
        let student = service.provision(&claims).await.expect("provision");
        assert_eq!(student.id, winner_id);
    }
}
