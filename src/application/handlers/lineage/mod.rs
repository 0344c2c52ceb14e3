//! Lineage handlers - lot↔pallet links and their resolution.

mod create_link;
mod get_pallet_lots;
mod resolve_pallets;

pub use create_link::{
    CreateLotPalletLinkCommand, CreateLotPalletLinkError, CreateLotPalletLinkHandler,
    CreateLotPalletLinkResult,
};
pub use get_pallet_lots::{
    GetPalletLotsError, GetPalletLotsHandler, GetPalletLotsQuery, LotContribution,
    PalletLotsView,
};
pub use resolve_pallets::{ResolvePalletsError, ResolvePalletsHandler, ResolvePalletsQuery};
