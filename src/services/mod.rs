pub mod assessments;
pub mod auth;
pub mod classes;
pub mod notifications;
pub mod students;
pub mod subjects;
pub mod users;

pub use assessments::AssessmentService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use notifications::NotificationService;
pub use students::StudentService;
pub use subjects::SubjectService;
pub use users::UserService;
