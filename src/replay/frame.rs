use super::types::{
    Death, Direction, Frame, GameMeta, Point, RawPoint, RawSnake, RawSnapshot, Segment,
    SegmentType, Snake,
};

pub fn format_frame(raw: &RawSnapshot) -> Frame {
    Frame {
        turn: raw.turn.unwrap_or(0),
        food: raw.food.iter().map(to_point).collect(),
        snakes: raw.snakes.iter().map(format_snake).collect(),
        game_over: false,
    }
}

/// Looks up a turn in a buffer whose turns run contiguously from 0, so the
/// turn doubles as the index.
pub fn get_frame_by_turn(frames: &[Frame], turn: u32) -> Option<&Frame> {
    frames
        .get(turn as usize)
        .filter(|frame| frame.turn == turn)
}

/// A frame ends the game once the engine has stopped running it and nobody is
/// left to play: every snake is dead, or a multi-snake game is down to one.
pub fn is_terminal(meta: &GameMeta, frame: &Frame) -> bool {
    if meta.is_running() || frame.snakes.is_empty() {
        return false;
    }
    let alive = frame.snakes.iter().filter(|snake| !snake.is_dead).count();
    alive == 0 || (frame.snakes.len() > 1 && alive <= 1)
}

fn to_point(raw: &RawPoint) -> Point {
    Point {
        x: raw.x.unwrap_or(0),
        y: raw.y.unwrap_or(0),
    }
}

fn format_snake(raw: &RawSnake) -> Snake {
    let death = raw.death.as_ref().map(|death| Death {
        cause: death.cause.clone(),
        turn: death.turn.unwrap_or(0),
    });
    let positions: Vec<Point> = raw.body.iter().map(to_point).collect();
    Snake {
        id: raw.id.clone(),
        name: raw.name.clone(),
        health: raw.health,
        color: raw.color.clone(),
        body: format_body(&positions),
        is_dead: death.is_some(),
        death,
        head: None,
        tail: None,
        head_svg: None,
        tail_svg: None,
    }
}

fn format_body(positions: &[Point]) -> Vec<Segment> {
    let last = positions.len().saturating_sub(1);
    positions
        .iter()
        .enumerate()
        .map(|(index, point)| Segment {
            x: point.x,
            y: point.y,
            direction: segment_direction(positions, index),
            kind: segment_type(index, last),
            should_render: true,
        })
        .collect()
}

fn segment_type(index: usize, last: usize) -> SegmentType {
    if index == 0 {
        SegmentType::Head
    } else if index == last {
        SegmentType::Tail
    } else {
        SegmentType::Body
    }
}

// The head faces away from the segment behind it; every other segment faces
// the one ahead of it.
fn segment_direction(positions: &[Point], index: usize) -> Direction {
    let (ahead, behind) = match index {
        0 => match positions.get(1) {
            Some(next) => (positions[0], *next),
            None => return Direction::Up,
        },
        _ => (positions[index - 1], positions[index]),
    };
    direction_of(ahead.x - behind.x, ahead.y - behind.y)
}

/// Board y grows downward. On a diagonal the x axis wins.
fn direction_of(dx: i64, dy: i64) -> Direction {
    if dx > 0 {
        Direction::Right
    } else if dx < 0 {
        Direction::Left
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::types::{GameInfo, RawDeath};

    fn raw_point(x: i64, y: i64) -> RawPoint {
        RawPoint {
            x: Some(x),
            y: Some(y),
        }
    }

    fn raw_snake(id: &str, body: &[(i64, i64)]) -> RawSnake {
        RawSnake {
            id: id.to_string(),
            name: format!("snake {id}"),
            health: 80,
            color: "red".to_string(),
            body: body.iter().map(|(x, y)| raw_point(*x, *y)).collect(),
            death: None,
        }
    }

    fn directions(snake: &Snake) -> Vec<Direction> {
        snake.body.iter().map(|segment| segment.direction).collect()
    }

    fn meta(status: &str) -> GameMeta {
        GameMeta {
            game: GameInfo {
                status: status.to_string(),
                ..GameInfo::default()
            },
        }
    }

    #[test]
    fn formats_snakes_on_valid_board() {
        let raw = RawSnapshot {
            turn: Some(1),
            food: vec![raw_point(5, 2), raw_point(1, 8)],
            snakes: vec![
                raw_snake("snake1", &[(0, 0), (0, 1), (0, 2)]),
                raw_snake("snake2", &[(5, 3), (6, 3), (6, 4), (7, 4)]),
            ],
        };

        let frame = format_frame(&raw);

        assert_eq!(frame.turn, 1);
        assert!(!frame.game_over);
        assert_eq!(frame.food, vec![Point { x: 5, y: 2 }, Point { x: 1, y: 8 }]);
        assert_eq!(frame.snakes.len(), 2);

        let first = &frame.snakes[0];
        assert_eq!(first.id, "snake1");
        assert_eq!(first.name, "snake snake1");
        assert_eq!(first.health, 80);
        assert!(!first.is_dead);
        assert!(first.death.is_none());
        assert_eq!(directions(first), vec![Direction::Up; 3]);
        assert_eq!(
            first.body.iter().map(|segment| segment.kind).collect::<Vec<_>>(),
            vec![SegmentType::Head, SegmentType::Body, SegmentType::Tail]
        );
        assert!(first.body.iter().all(|segment| segment.should_render));
        assert!(first.head.is_none() && first.tail.is_none());
        assert!(first.head_svg.is_none() && first.tail_svg.is_none());

        assert_eq!(
            directions(&frame.snakes[1]),
            vec![
                Direction::Left,
                Direction::Left,
                Direction::Up,
                Direction::Left
            ]
        );
    }

    #[test]
    fn recognizes_dead_snakes() {
        let mut snake = raw_snake("snake1", &[(1, 1), (0, 1), (0, 0)]);
        snake.death = Some(RawDeath {
            cause: "asdf".to_string(),
            turn: Some(3),
        });
        let frame = format_frame(&RawSnapshot {
            turn: Some(1),
            food: Vec::new(),
            snakes: vec![snake],
        });

        let snake = &frame.snakes[0];
        assert!(snake.is_dead);
        assert_eq!(
            snake.death,
            Some(Death {
                cause: "asdf".to_string(),
                turn: 3
            })
        );
        assert_eq!(
            directions(snake),
            vec![Direction::Right, Direction::Right, Direction::Down]
        );
    }

    #[test]
    fn missing_numbers_default_to_zero() {
        let mut snake = raw_snake("snake1", &[]);
        snake.body = vec![RawPoint::default()];
        snake.death = Some(RawDeath {
            cause: "asdf".to_string(),
            turn: None,
        });
        let frame = format_frame(&RawSnapshot {
            turn: None,
            food: vec![RawPoint::default(), RawPoint { x: Some(4), y: None }],
            snakes: vec![snake],
        });

        assert_eq!(frame.turn, 0);
        assert_eq!(frame.food, vec![Point { x: 0, y: 0 }, Point { x: 4, y: 0 }]);
        let snake = &frame.snakes[0];
        assert_eq!(snake.death.as_ref().map(|death| death.turn), Some(0));
        assert_eq!(
            snake.body,
            vec![Segment {
                x: 0,
                y: 0,
                direction: Direction::Up,
                kind: SegmentType::Head,
                should_render: true,
            }]
        );
    }

    #[test]
    fn single_segment_is_an_upward_head() {
        let frame = format_frame(&RawSnapshot {
            turn: Some(4),
            food: Vec::new(),
            snakes: vec![raw_snake("solo", &[(7, 2)])],
        });
        let segment = &frame.snakes[0].body[0];
        assert_eq!(segment.direction, Direction::Up);
        assert_eq!(segment.kind, SegmentType::Head);
    }

    #[test]
    fn stacked_segments_face_up() {
        let frame = format_frame(&RawSnapshot {
            turn: Some(0),
            food: Vec::new(),
            snakes: vec![raw_snake("fresh", &[(3, 3), (3, 3), (3, 3)])],
        });
        assert_eq!(directions(&frame.snakes[0]), vec![Direction::Up; 3]);
    }

    #[test]
    fn diagonal_delta_prefers_x_axis() {
        assert_eq!(direction_of(1, 1), Direction::Right);
        assert_eq!(direction_of(-1, -1), Direction::Left);
        assert_eq!(direction_of(0, 1), Direction::Down);
        assert_eq!(direction_of(0, -1), Direction::Up);
    }

    #[test]
    fn finds_frames_by_turn() {
        let frames: Vec<Frame> = (0..3)
            .map(|turn| {
                format_frame(&RawSnapshot {
                    turn: Some(turn),
                    ..RawSnapshot::default()
                })
            })
            .collect();
        assert_eq!(get_frame_by_turn(&frames, 2).map(|frame| frame.turn), Some(2));
        assert!(get_frame_by_turn(&frames, 3).is_none());
        assert!(get_frame_by_turn(&frames[1..], 1).is_none());
    }

    #[test]
    fn terminal_needs_a_finished_game_and_no_contest() {
        let mut dead = raw_snake("a", &[(0, 0)]);
        dead.death = Some(RawDeath::default());
        let survivor = raw_snake("b", &[(2, 2)]);
        let frame = format_frame(&RawSnapshot {
            turn: Some(9),
            food: Vec::new(),
            snakes: vec![dead.clone(), survivor.clone()],
        });

        assert!(is_terminal(&meta("complete"), &frame));
        assert!(!is_terminal(&meta("running"), &frame));

        let solo_alive = format_frame(&RawSnapshot {
            turn: Some(9),
            food: Vec::new(),
            snakes: vec![survivor],
        });
        assert!(!is_terminal(&meta("complete"), &solo_alive));

        let solo_dead = format_frame(&RawSnapshot {
            turn: Some(9),
            food: Vec::new(),
            snakes: vec![dead],
        });
        assert!(is_terminal(&meta("complete"), &solo_dead));
    }

    #[test]
    fn parses_engine_json() {
        let raw: RawSnapshot = serde_json::from_str(
            r#"{"Food":[{"X":1}],"Snakes":[{"ID":"s","Name":"n","URL":"http://s","Health":99,
            "Color":"blue","Body":[{"X":2,"Y":3},{"X":2,"Y":4}],"Death":{"Cause":"wall"}}]}"#,
        )
        .expect("snapshot");
        let frame = format_frame(&raw);
        assert_eq!(frame.turn, 0);
        assert_eq!(frame.food, vec![Point { x: 1, y: 0 }]);
        assert_eq!(frame.snakes[0].death.as_ref().map(|d| d.cause.as_str()), Some("wall"));
        assert_eq!(directions(&frame.snakes[0]), vec![Direction::Up, Direction::Up]);
    }
}
