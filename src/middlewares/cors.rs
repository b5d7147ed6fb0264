use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // 管理后台与会员端部署在不同域名
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["Content-Disposition"])
        .supports_credentials()
        .max_age(3600)
}
