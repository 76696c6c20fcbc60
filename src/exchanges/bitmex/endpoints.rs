//! REST paths, relative to `{base_url}/api/v1`.

// Instrument : Tradeable Contracts, Indices, and History
pub const INSTRUMENT: &str = "instrument";

// Order : Placement, Cancellation, Amending, and History
pub const ORDER: &str = "order";
pub const ORDER_ALL: &str = "order/all";
pub const ORDER_CLOSE_POSITION: &str = "order/closePosition";

// OrderBook : Level 2 Book Data
pub const ORDER_BOOK_L2: &str = "orderBook/L2";

// Position : Summary of Open and Closed Positions
pub const POSITION: &str = "position";
pub const POSITION_LEVERAGE: &str = "position/leverage";

// Trade : Individual & Bucketed Trades
pub const TRADE_BUCKETED: &str = "trade/bucketed";

// User : Account Operations
pub const USER_MARGIN: &str = "user/margin";
pub const USER_WALLET: &str = "user/wallet";

/// Settlement currency of every account query
pub const ACCOUNT_CURRENCY: &str = "XBt";

/// `execInst` value that keeps an order on the book as maker only
pub const EXEC_INST_POST_ONLY: &str = "ParticipateDoNotInitiate";

pub const DEFAULT_ORDER_BOOK_DEPTH: u32 = 25;
