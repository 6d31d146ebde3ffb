pub mod config;
pub mod clients {
    pub mod order;
    pub mod workflow;
}
pub mod domain {
    pub mod callback;
    pub mod order;
    pub mod payment;
}
pub mod error;
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod callbacks;
        pub mod payments;
    }
    pub mod router;
}
pub mod service {
    pub mod payment_service;
}

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
}
