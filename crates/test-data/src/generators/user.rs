//! User generation for every role.

use fake::{Fake, faker::name::en::Name};
use rand::Rng;
use uuid::Uuid;

use attendance::models::Role;

/// Generated user data ready for database insertion.
#[derive(Debug, Clone)]
pub struct GeneratedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Configuration for user generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    /// Domain used for staff accounts (admins and teachers).
    pub staff_domain: String,
    /// Domain used for student accounts.
    pub student_domain: String,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            staff_domain: "faculty.example.edu".to_string(),
            student_domain: "students.example.edu".to_string(),
        }
    }
}

/// Generates realistic user data for testing.
pub struct UserGenerator {
    config: UserGenConfig,
}

impl UserGenerator {
    /// Creates a new user generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: UserGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: UserGenConfig) -> Self {
        Self { config }
    }

    /// Generates a single user with the given role.
    pub fn generate(&self, role: Role, rng: &mut impl Rng) -> GeneratedUser {
        let name: String = Name().fake_with_rng(rng);
        let email = self.generate_email(&name, role, rng);

        GeneratedUser {
            id: Uuid::new_v4(),
            name,
            email,
            role,
        }
    }

    /// Generates multiple users with the same role.
    pub fn generate_batch(
        &self,
        role: Role,
        count: usize,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedUser> {
        (0..count).map(|_| self.generate(role, rng)).collect()
    }

    /// The administrator account, with a fixed email so it can be found again.
    pub fn admin(&self, email: &str) -> GeneratedUser {
        GeneratedUser {
            id: Uuid::new_v4(),
            name: "Administrator".to_string(),
            email: email.to_string(),
            role: Role::Admin,
        }
    }

    /// Generates an email from a name. The random suffix keeps emails unique
    /// across namesakes.
    fn generate_email(&self, name: &str, role: Role, rng: &mut impl Rng) -> String {
        let normalized: String = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == ' ')
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(".");

        let suffix: u32 = rng.gen_range(1..99999);
        let domain = match role {
            Role::Student => &self.config.student_domain,
            Role::Admin | Role::Teacher => &self.config.staff_domain,
        };

        format!("{normalized}{suffix}@{domain}")
    }
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_user() {
        let user_gen = UserGenerator::new();
        let mut rng = rand::thread_rng();
        let user = user_gen.generate(Role::Student, &mut rng);

        assert!(!user.name.is_empty());
        assert!(user.email.ends_with("@students.example.edu"));
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn test_staff_use_staff_domain() {
        let user_gen = UserGenerator::new();
        let mut rng = rand::thread_rng();
        let teacher = user_gen.generate(Role::Teacher, &mut rng);

        assert!(teacher.email.ends_with("@faculty.example.edu"));
        assert_eq!(user_gen.admin("root@example.com").role, Role::Admin);
    }

    #[test]
    fn test_generate_batch() {
        let user_gen = UserGenerator::new();
        let mut rng = rand::thread_rng();
        let users = user_gen.generate_batch(Role::Student, 10, &mut rng);

        assert_eq!(users.len(), 10);

        // All UUIDs should be unique
        let ids: std::collections::HashSet<_> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 10);
    }
}
