mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .wrap(limiter::global_middleware(config_data.global_rate_limit))
            .wrap(logger::middleware()) // 3rd
            .wrap(extractor::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    // the gateway posts payment results here; no bearer token
                    .service(api_subs::mount_callback())
                    .service(
                        web::scope("/member")
                            .wrap(extractor::auth_middleware())
                            .service(api_subs::mount_subs())
                            .service(api_subs::mount_quota())
                            .service(api_subs::mount_pay()),
                    )
                    .service(
                        web::scope("/admin")
                            .wrap(extractor::auth_middleware())
                            .service(api_admin::mount_admin())
                            .service(api_admin::mount_admin_pay()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
