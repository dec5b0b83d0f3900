use actix_web::web::{self};

pub mod routes {
    pub mod pay;
    pub mod sub;
}

mod services {
    pub(crate) mod guard;
    pub(crate) mod sub;
}

mod dtos {
    pub(crate) mod sub;
}

pub fn mount_admin() -> actix_web::Scope {
    web::scope("/sub")
        .service(routes::sub::post_extend)
        .service(routes::sub::post_adjust_days)
        .service(routes::sub::patch_status)
        .service(routes::sub::get_search)
        .service(routes::sub::get_expiring)
        .service(routes::sub::get_stats)
}

pub fn mount_admin_pay() -> actix_web::Scope {
    web::scope("/pay").service(routes::pay::get_gateway_status)
}
