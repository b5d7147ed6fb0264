use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use fitdesk_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::CloudinaryService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);

    let cloudinary_service = CloudinaryService::new(config.cloudinary.clone());
    if !cloudinary_service.is_configured() {
        log::warn!("Cloudinary is not configured; payment proof uploads will fail");
    }

    // 创建服务
    let renewal_config = config.renewal.clone();
    let expiration_service = ExpirationService::new(pool.clone(), renewal_config.clone());
    let renewal_service = RenewalService::new(pool.clone(), renewal_config.clone());
    let automation_service =
        AutomationService::new(pool.clone(), renewal_service.clone(), renewal_config.clone());
    let membership_service = MembershipService::new(pool.clone());
    let member_service = MemberService::new(pool.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone(), cloudinary_service);
    let export_service = ExportService::new(pool.clone());
    let tenant_service = TenantService::new(pool.clone());
    let subscription_service = SubscriptionService::new(pool.clone());

    // 后台任务：过期检查 + 每月自动续费
    tasks::spawn_all(
        expiration_service.clone(),
        automation_service.clone(),
        renewal_config.scan_interval_secs,
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(expiration_service.clone()))
            .app_data(web::Data::new(renewal_service.clone()))
            .app_data(web::Data::new(automation_service.clone()))
            .app_data(web::Data::new(membership_service.clone()))
            .app_data(web::Data::new(member_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(export_service.clone()))
            .app_data(web::Data::new(tenant_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::renewal_config)
                    .configure(handlers::automation_config)
                    .configure(handlers::membership_config)
                    .configure(handlers::member_config)
                    .configure(handlers::catalog_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::report_config)
                    .configure(handlers::tenant_config)
                    .configure(handlers::subscription_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
