//! Idempotent startup seeding.
//!
//! Every step checks current state before writing, so repeated startups
//! (and racing replicas) converge on the same data: one admin account with
//! a known password, four sample students, and a sample catalog inserted
//! only while the catalog is empty.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    CoursePersistenceError, CourseRepository, StudentPersistenceError, StudentRepository,
};
use crate::domain::{Course, Error, Role, Student, password};

/// Fixed identifier of the seeded admin account.
pub const ADMIN_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "Admin123!";

/// Fixed-id sample students so seeded data is stable across environments.
/// The empty password hash means they cannot password-login.
const SAMPLE_STUDENTS: &[(u128, &str, &str, &str)] = &[
    (
        0x1111_1111_1111_1111_1111_1111_1111_1111,
        "john.doe@example.com",
        "John",
        "Doe",
    ),
    (
        0x2222_2222_2222_2222_2222_2222_2222_2222,
        "jane.smith@example.com",
        "Jane",
        "Smith",
    ),
    (
        0x3333_3333_3333_3333_3333_3333_3333_3333,
        "bob.johnson@example.com",
        "Bob",
        "Johnson",
    ),
    (
        0x4444_4444_4444_4444_4444_4444_4444_4444,
        "alice.williams@example.com",
        "Alice",
        "Williams",
    ),
];

const SAMPLE_COURSES: &[(&str, &str, i64)] = &[
    ("Introduction to Programming", "Learn the fundamentals of programming", 30),
    ("Database Design", "Design and implement relational databases", 25),
    ("Web Development", "Build modern web applications", 35),
    ("Software Engineering", "Principles and practices of software development", 20),
    ("Data Structures and Algorithms", "Essential data structures and algorithm design", 28),
    ("Object-Oriented Programming", "Master OOP concepts and design patterns", 32),
    ("Mobile App Development", "Create cross-platform mobile applications", 24),
    ("Cloud Computing", "Introduction to cloud services and architecture", 26),
    ("Machine Learning Basics", "Fundamentals of ML and data science", 22),
    ("Cybersecurity Fundamentals", "Learn about security threats and protection", 18),
    ("DevOps Practices", "CI/CD pipelines and deployment strategies", 30),
    ("UI/UX Design", "Design principles and user experience", 28),
    ("API Development", "RESTful APIs and microservices architecture", 25),
    ("Testing and Quality Assurance", "Software testing methodologies", 20),
    ("Project Management", "Agile and Scrum methodologies", 30),
    ("Version Control Systems", "Git and collaborative development", 22),
    ("Containerization", "Docker and Kubernetes basics", 24),
    ("Frontend Frameworks", "React, Angular, and Vue.js overview", 28),
    ("Backend Development", "Server-side programming and databases", 30),
    ("Full Stack Development", "End-to-end web application development", 26),
    ("Game Development", "Introduction to game programming", 20),
    ("Blockchain Technology", "Cryptocurrency and smart contracts", 18),
    ("Artificial Intelligence", "AI concepts and applications", 22),
    ("Network Programming", "Socket programming and protocols", 24),
    ("System Administration", "Linux and server management", 20),
];

/// Build the sample catalog with staggered creation dates, oldest first.
pub fn sample_courses() -> Vec<Course> {
    let now = Utc::now();
    let total = SAMPLE_COURSES.len() as i64;
    SAMPLE_COURSES
        .iter()
        .enumerate()
        .map(|(i, (name, description, capacity))| Course {
            id: Uuid::new_v4(),
            name: (*name).to_owned(),
            description: (*description).to_owned(),
            capacity: *capacity,
            created_at: now - Duration::days(30 * (total - i as i64)),
        })
        .collect()
}

fn student_error(error: StudentPersistenceError) -> Error {
    Error::internal(error.to_string())
}

fn course_error(error: CoursePersistenceError) -> Error {
    Error::internal(error.to_string())
}

async fn ensure_admin(students: &dyn StudentRepository) -> Result<(), Error> {
    match students
        .find_by_email(ADMIN_EMAIL)
        .await
        .map_err(student_error)?
    {
        None => {
            let admin = Student {
                id: ADMIN_ID,
                email: ADMIN_EMAIL.to_owned(),
                first_name: "System".into(),
                last_name: "Administrator".into(),
                password_hash: password::hash_password(ADMIN_PASSWORD)?,
                role: Role::Admin,
                created_at: Utc::now(),
            };
            match students.insert(&admin).await {
                Ok(()) => info!(student_id = %ADMIN_ID, "seeded admin account"),
                // Another replica seeded the admin first.
                Err(StudentPersistenceError::DuplicateEmail { .. }) => {}
                Err(other) => return Err(student_error(other)),
            }
        }
        Some(existing) if existing.role != Role::Admin => {
            students
                .set_role(existing.id, Role::Admin)
                .await
                .map_err(student_error)?;
            info!(student_id = %existing.id, "corrected drifted admin role");
        }
        Some(_) => {}
    }
    Ok(())
}

async fn ensure_sample_students(students: &dyn StudentRepository) -> Result<(), Error> {
    for (raw_id, email, first_name, last_name) in SAMPLE_STUDENTS {
        let id = Uuid::from_u128(*raw_id);
        if students
            .find_by_id(id)
            .await
            .map_err(student_error)?
            .is_some()
        {
            continue;
        }
        let student = Student {
            id,
            email: (*email).to_owned(),
            first_name: (*first_name).to_owned(),
            last_name: (*last_name).to_owned(),
            password_hash: String::new(),
            role: Role::Student,
            created_at: Utc::now(),
        };
        match students.insert(&student).await {
            Ok(()) | Err(StudentPersistenceError::DuplicateEmail { .. }) => {}
            Err(other) => return Err(student_error(other)),
        }
    }
    Ok(())
}

async fn ensure_sample_catalog(courses: &dyn CourseRepository) -> Result<(), Error> {
    if courses.count().await.map_err(course_error)? > 0 {
        return Ok(());
    }
    let catalog = sample_courses();
    let total = catalog.len();
    for course in &catalog {
        courses.insert(course).await.map_err(course_error)?;
    }
    info!(count = total, "seeded sample course catalog");
    Ok(())
}

/// Bring the database to its seeded baseline.
pub async fn run(
    students: Arc<dyn StudentRepository>,
    courses: Arc<dyn CourseRepository>,
) -> Result<(), Error> {
    ensure_admin(students.as_ref()).await?;
    ensure_sample_students(students.as_ref()).await?;
    ensure_sample_catalog(courses.as_ref()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CourseRepository, StudentRepository};
    use crate::outbound::persistence::{
        SqliteCourseRepository, SqliteStudentRepository, connect_in_memory,
    };

    struct Fixture {
        students: Arc<SqliteStudentRepository>,
        courses: Arc<SqliteCourseRepository>,
    }

    async fn fixture() -> Fixture {
        let pool = connect_in_memory().await.expect("open in-memory db");
        Fixture {
            students: Arc::new(SqliteStudentRepository::new(pool.clone())),
            courses: Arc::new(SqliteCourseRepository::new(pool)),
        }
    }

    async fn run_seed(fx: &Fixture) {
        run(fx.students.clone(), fx.courses.clone())
            .await
            .expect("seed");
    }

    #[tokio::test]
    async fn seeds_admin_students_and_catalog() {
        let fx = fixture().await;
        run_seed(&fx).await;

        let admin = fx
            .students
            .find_by_email(ADMIN_EMAIL)
            .await
            .expect("query")
            .expect("admin present");
        assert_eq!(admin.id, ADMIN_ID);
        assert_eq!(admin.role, Role::Admin);
        assert!(password::verify_password(&admin.password_hash, ADMIN_PASSWORD));

        for (raw_id, ..) in SAMPLE_STUDENTS {
            let seeded = fx
                .students
                .find_by_id(Uuid::from_u128(*raw_id))
                .await
                .expect("query");
            assert!(seeded.is_some());
        }

        assert_eq!(
            fx.courses.count().await.expect("count"),
            SAMPLE_COURSES.len() as i64
        );
    }

    #[tokio::test]
    async fn reseeding_is_idempotent() {
        let fx = fixture().await;
        run_seed(&fx).await;
        run_seed(&fx).await;

        assert_eq!(
            fx.courses.count().await.expect("count"),
            SAMPLE_COURSES.len() as i64
        );
    }

    #[tokio::test]
    async fn corrects_a_drifted_admin_role() {
        let fx = fixture().await;
        run_seed(&fx).await;

        fx.students
            .set_role(ADMIN_ID, Role::Student)
            .await
            .expect("drift role");
        run_seed(&fx).await;

        let admin = fx
            .students
            .find_by_id(ADMIN_ID)
            .await
            .expect("query")
            .expect("admin present");
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn catalog_is_not_reseeded_once_populated() {
        let fx = fixture().await;
        run_seed(&fx).await;

        // Simulate an admin trimming the catalog; a restart must not refill it.
        let page = fx
            .courses
            .list(
                &crate::domain::CourseQuery::new(0, 100, None, None, None).expect("query"),
            )
            .await
            .expect("list");
        let victim = page.items[0].course.id;
        fx.courses.delete(victim).await.expect("delete");

        run_seed(&fx).await;
        assert_eq!(
            fx.courses.count().await.expect("count"),
            SAMPLE_COURSES.len() as i64 - 1
        );
    }

    #[test]
    fn sample_catalog_is_oldest_first() {
        let catalog = sample_courses();
        assert_eq!(catalog.len(), 25);
        assert!(catalog[0].created_at < catalog[1].created_at);
    }
}
