#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod learning_service;
pub mod user_service;

pub use tutor_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, LearningServiceError, UserServiceError};
pub use learning_service::{
    DashboardView, LearningService, LessonListView, LessonStatus, ProfileView, QuizSubmission,
    RecommendationView,
};
pub use user_service::UserService;
