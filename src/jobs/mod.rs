// One module per snapshot job; each wires fetcher -> transforms -> report.
pub mod dex_volume;
pub mod top_movers;
