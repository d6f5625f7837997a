//! Treasury: cashboxes and the three cash vouchers.
//!
//! - [`CashPayment`]: money leaves a cashbox (DR contra, CR cashbox)
//! - [`CashReceipt`]: money enters a cashbox (DR cashbox, CR contra)
//! - [`CashTransfer`]: money moves between cashboxes (DR target, CR source)

pub mod cash_payment;
pub mod cash_receipt;
pub mod cash_transfer;
pub mod cashbox;
pub mod error;
pub mod voucher;

pub use cash_payment::CashPayment;
pub use cash_receipt::CashReceipt;
pub use cash_transfer::{CashTransfer, CashTransferInput};
pub use cashbox::Cashbox;
pub use error::TreasuryError;
pub use voucher::CashVoucherInput;
