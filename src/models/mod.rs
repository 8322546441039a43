pub mod draft;
pub mod qr;
pub mod ticket;
