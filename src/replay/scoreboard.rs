use super::types::Snake;
use std::cmp::Reverse;

/// Living snakes by name, then the dead with the most recent death first.
pub fn order_snakes(snakes: &[Snake]) -> Vec<&Snake> {
    let mut alive: Vec<&Snake> = snakes.iter().filter(|snake| !snake.is_dead).collect();
    alive.sort_by_key(|snake| snake.name.to_lowercase());

    let mut dead: Vec<&Snake> = snakes.iter().filter(|snake| snake.is_dead).collect();
    dead.sort_by_key(|snake| Reverse(snake.death.as_ref().map_or(0, |death| death.turn)));

    alive.extend(dead);
    alive
}
