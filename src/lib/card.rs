//! Playing cards, used as a demonstration element type.
//!
//! Cards order by suit first and rank second, so a full deck stored in a
//! [`Tree23`](crate::Tree23) iterates as all clubs, then diamonds, hearts and
//! spades, each from two to ace.

use std::cmp::Ordering;
use std::fmt;

/// Card rank, from lowest to highest.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// Card suit, from lowest to highest.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Rank {
    /// Every rank in ascending order.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
}

impl Suit {
    /// Every suit in ascending order.
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

/// A playing card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    /// The card's rank.
    pub rank: Rank,
    /// The card's suit.
    pub suit: Suit,
}

impl Card {
    /// Number of cards in a full deck.
    pub const DECK_COUNT: usize = Rank::ALL.len() * Suit::ALL.len();

    /// Creates a card.
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    /// Creates a card from zero-based rank and suit ordinals, or `None` if
    /// either is out of range.
    pub fn from_ordinals(rank: usize, suit: usize) -> Option<Self> {
        Some(Card::new(*Rank::ALL.get(rank)?, *Suit::ALL.get(suit)?))
    }

    /// Every card of a deck, in ascending order.
    pub fn deck() -> impl Iterator<Item = Card> {
        Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.suit
            .cmp(&other.suit)
            .then_with(|| self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} of {:?}", self.rank, self.suit)
    }
}
