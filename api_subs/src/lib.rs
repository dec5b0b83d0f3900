use actix_web::web::{self};

pub mod routes {
    pub mod pay;
    pub mod quota;
    pub mod sub;
}

mod services {
    pub(crate) mod pay;
    pub(crate) mod quota;
    pub(crate) mod sub;
}

mod dtos {
    pub(crate) mod pay;
    pub(crate) mod quota;
    pub(crate) mod sub;
}

pub fn mount_subs() -> actix_web::Scope {
    web::scope("/sub")
        .service(routes::sub::get_plans)
        .service(routes::sub::get_status)
        .service(routes::sub::get_notifications)
        .service(routes::sub::post_notification_read)
}

pub fn mount_quota() -> actix_web::Scope {
    web::scope("/quota")
        .service(routes::quota::post_check)
        .service(routes::quota::post_deduct)
}

pub fn mount_pay() -> actix_web::Scope {
    web::scope("/pay")
        .service(routes::pay::post_create)
        .service(routes::pay::get_payments)
}

pub fn mount_callback() -> actix_web::Scope {
    web::scope("/pay").service(routes::pay::post_callback)
}
