pub mod seed_activity;
pub mod verify_analytics_view;
pub mod verify_dashboard;

pub use seed_activity::SeedActivityTestCase;
pub use verify_analytics_view::VerifyAnalyticsViewTestCase;
pub use verify_dashboard::VerifyDashboardTestCase;
