//! Session command parsing.
//!
//! One command per input line. Amount arguments are kept as raw text
//! so the numeric input rules (separator, scale) apply to them exactly
//! as they do to typed field input.

use rust_decimal::Decimal;
use thiserror::Error;

use order_input_engine::domain::decimal;
use order_input_engine::domain::order::{OrderSide, OrderType};

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pairs,
    Pair(usize),
    Side(OrderSide),
    Type(OrderType),
    Price(String),
    BestPrice,
    Quantity(String),
    Total(String),
    Percentage(Decimal),
    Max,
    PostOnly,
    Book { best_buy: Decimal, best_sell: Decimal },
    Wallet(Option<String>),
    Balances,
    Approve(bool),
    Reset,
    Submit,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Command name for metrics.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pairs => "pairs",
            Self::Pair(_) => "pair",
            Self::Side(_) => "side",
            Self::Type(_) => "type",
            Self::Price(_) => "price",
            Self::BestPrice => "best",
            Self::Quantity(_) => "qty",
            Self::Total(_) => "total",
            Self::Percentage(_) => "pct",
            Self::Max => "max",
            Self::PostOnly => "postonly",
            Self::Book { .. } => "book",
            Self::Wallet(_) => "wallet",
            Self::Balances => "balances",
            Self::Approve(_) => "approve",
            Self::Reset => "reset",
            Self::Submit => "submit",
            Self::Show => "show",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid {what}: '{value}'")]
    Invalid { what: &'static str, value: String },
}

pub const HELP: &str = "\
commands:
  pairs                      list configured pairs
  pair <index>               select a pair
  side buy|sell              switch side (clears input)
  type market|limit          switch order type (clears input)
  price <amount>             set the limit price
  best                       use the best price as limit price
  qty <amount>               type a token1 amount (empty clears)
  total <amount>             type a token2 amount (empty clears)
  pct <0-100>                size from balance (debounced)
  max                        use the whole available balance
  postonly                   toggle post-only
  book <best_buy> <best_sell> update top of book
  wallet <address>|off       connect or disconnect a wallet
  balances                   refresh wallet balances
  approve on|off             paper wallet approves submissions
  reset                      clear user input
  submit                     submit the order
  show                       print the order form
  quit                       exit";

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let head = head.to_ascii_lowercase();
    let arg = words.next();

    let command = match head.as_str() {
        "pairs" => Command::Pairs,
        "pair" => {
            let raw = required(arg, "pair", "an index")?;
            let index = raw.parse().map_err(|_| invalid("pair index", raw))?;
            Command::Pair(index)
        }
        "side" => match required(arg, "side", "buy or sell")?.to_ascii_lowercase().as_str() {
            "buy" => Command::Side(OrderSide::Buy),
            "sell" => Command::Side(OrderSide::Sell),
            other => return Err(invalid("side", other)),
        },
        "type" => match required(arg, "type", "market or limit")?
            .to_ascii_lowercase()
            .as_str()
        {
            "market" => Command::Type(OrderType::Market),
            "limit" => Command::Type(OrderType::Limit),
            other => return Err(invalid("order type", other)),
        },
        "price" => Command::Price(arg.unwrap_or_default().to_string()),
        "best" => Command::BestPrice,
        "qty" | "quantity" => Command::Quantity(arg.unwrap_or_default().to_string()),
        "total" => Command::Total(arg.unwrap_or_default().to_string()),
        "pct" | "percent" => {
            let raw = required(arg, "pct", "a percentage")?;
            let percentage =
                decimal::parse(raw.trim_end_matches('%')).map_err(|_| invalid("percentage", raw))?;
            Command::Percentage(percentage)
        }
        "max" | "available" => Command::Max,
        "postonly" => Command::PostOnly,
        "book" => {
            let buy = required(arg, "book", "best buy and best sell prices")?;
            let sell = required(words.next(), "book", "best buy and best sell prices")?;
            Command::Book {
                best_buy: decimal::parse(buy).map_err(|_| invalid("price", buy))?,
                best_sell: decimal::parse(sell).map_err(|_| invalid("price", sell))?,
            }
        }
        "wallet" => match required(arg, "wallet", "an address or 'off'")? {
            "off" => Command::Wallet(None),
            address => Command::Wallet(Some(address.to_string())),
        },
        "balances" => Command::Balances,
        "approve" => match required(arg, "approve", "on or off")? {
            "on" => Command::Approve(true),
            "off" => Command::Approve(false),
            other => return Err(invalid("approval", other)),
        },
        "reset" => Command::Reset,
        "submit" => Command::Submit,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(head)),
    };
    Ok(command)
}

fn required<'a>(
    arg: Option<&'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument { command, expected })
}

fn invalid(what: &'static str, value: &str) -> CommandError {
    CommandError::Invalid {
        what,
        value: value.to_string(),
    }
}
