//! The Punto Banco third-card protocol.
//!
//! The banker table below is fixed by the game; any deviation changes the
//! house edge. Naturals are handled before these predicates are consulted,
//! so banker totals of 8 and 9 never reach them.

/// Player draws on a two-card total of five or less.
pub const fn player_draws(player_total: u8) -> bool {
    player_total <= 5
}

/// When the player stands on 6 or 7, the banker draws on five or less.
pub const fn banker_draws_unassisted(banker_total: u8) -> bool {
    banker_total <= 5
}

/// When the player drew, the banker's decision is keyed on the banker's
/// two-card total and the point value of the player's third card.
pub const fn banker_draws(banker_total: u8, player_third_point: u8) -> bool {
    match banker_total {
        0 | 1 | 2 => true,
        3 => player_third_point != 8,
        4 => matches!(player_third_point, 2..=7),
        5 => matches!(player_third_point, 4..=7),
        6 => matches!(player_third_point, 6 | 7),
        _ => false,
    }
}
