pub mod app_config;
pub mod database;
pub mod order_repo;
pub mod product_repo;
pub mod report_repo;
pub mod user_repo;

pub use database::DbClient;
pub use order_repo::PgOrderRepository;
pub use product_repo::PgProductRepository;
pub use report_repo::PgReportRepository;
pub use user_repo::PgUserRepository;
