use life_inc_rules::FieldError;
use life_inc_rules::field::{Column, EngineConfig, LayoutKind, LifeField, RuleTable};
use rand::Rng;
use rand::SeedableRng;

const SIZE_LOG: u32 = 6;
const SIZE: usize = 1 << SIZE_LOG;

fn new_field() -> LifeField {
    LifeField::new(SIZE_LOG, LayoutKind::default()).unwrap()
}

fn set_cells(field: &mut LifeField, cells: &[(usize, usize)]) {
    field.set_alive_cells(cells).expect("cells in range");
}

fn age(field: &LifeField, x: usize, y: usize) -> u32 {
    field.query(x, y).expect("cell inside the field").age
}

fn assert_alive(field: &LifeField, cells: &[(usize, usize)]) {
    for &(x, y) in cells {
        assert!(age(field, x, y) > 0, "expected alive at ({x},{y})");
    }
}

fn assert_dead(field: &LifeField, cells: &[(usize, usize)]) {
    for &(x, y) in cells {
        assert_eq!(age(field, x, y), 0, "expected dead at ({x},{y})");
    }
}

fn seed_soup(field: &mut LifeField, seed: u64, density: f64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let size = field.size();
    for y in 0..size {
        for x in 0..size {
            if rng.random::<f64>() < density {
                field.toggle_cell(x, y).expect("inside the field");
            }
        }
    }
}

/// Straightforward full-field stepper over flat row-major buffers.
fn step_naive(ages: &[u32], protect: &[bool], rules: &RuleTable, size: usize) -> Vec<u32> {
    let mut next = vec![0; ages.len()];
    for y in 0..size {
        for x in 0..size {
            let idx = y * size + x;
            let mut neighbors = 0;
            for dy in [size - 1, 0, 1] {
                for dx in [size - 1, 0, 1] {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = (x + dx) % size;
                    let ny = (y + dy) % size;
                    if ages[ny * size + nx] > 0 {
                        neighbors += 1;
                    }
                }
            }
            let age = ages[idx];
            next[idx] = if protect[idx] {
                age
            } else if age == 0 {
                u32::from(rules.birth[neighbors])
            } else if rules.death[neighbors] {
                0
            } else {
                age + 1
            };
        }
    }
    next
}

#[test]
fn default_layout_reads_standard_conway() {
    let field = new_field();
    let rules = field.rules_area().read_rules(field.buffers());
    assert_eq!(
        rules.birth,
        [false, false, false, true, false, false, false, false, false]
    );
    assert_eq!(
        rules.death,
        [true, true, false, false, true, true, true, true, true]
    );
    assert_eq!(rules.to_string(), "B3/D0145678");
}

#[test]
fn corner_neighbors_wrap_around() {
    let mut field = new_field();
    let corners = [(SIZE - 1, SIZE - 1), (0, SIZE - 1), (SIZE - 1, 0)];
    set_cells(&mut field, &corners);

    field.step();

    assert_eq!(age(&field, 0, 0), 1, "(0,0) sees three wrapped neighbors");
    assert_alive(&field, &corners);
}

#[test]
fn blinker_straddling_the_edge_oscillates() {
    let mut field = new_field();
    set_cells(&mut field, &[(SIZE - 1, 5), (0, 5), (1, 5)]);

    field.step();
    assert_alive(&field, &[(0, 4), (0, 5), (0, 6)]);
    assert_dead(&field, &[(SIZE - 1, 5), (1, 5)]);

    field.step();
    assert_alive(&field, &[(SIZE - 1, 5), (0, 5), (1, 5)]);
    assert_dead(&field, &[(0, 4), (0, 6)]);
    assert_eq!(age(&field, 0, 5), 3);
}

#[test]
fn glider_translates_by_one_cell_every_four_steps() {
    let mut field = new_field();
    let glider = [(2, 3), (0, 4), (2, 4), (1, 5), (2, 5)];
    set_cells(&mut field, &glider);

    field.step_n(4);

    let shifted = [(3, 4), (1, 5), (3, 5), (2, 6), (3, 6)];
    assert_alive(&field, &shifted);
    assert_dead(&field, &[(2, 3), (0, 4), (2, 4), (1, 4), (2, 5)]);

    // Ages restart at each relocation and count up for cells that stayed put.
    assert_eq!(age(&field, 3, 4), 4);
    assert_eq!(age(&field, 3, 5), 3);
    assert_eq!(age(&field, 2, 6), 2);
    assert_eq!(age(&field, 1, 5), 1);
    assert_eq!(age(&field, 3, 6), 1);
    assert_eq!(field.generation_count(), 4);
}

#[test]
fn surviving_cells_age_by_one() {
    let mut field = new_field();
    field.fill_rect(5, 5, 2, 2, 10).unwrap();

    field.step_n(3);

    for (x, y) in [(5, 5), (6, 5), (5, 6), (6, 6)] {
        assert_eq!(age(&field, x, y), 13);
    }
}

#[test]
fn ages_saturate_at_configured_cap() {
    let config = EngineConfig::default().max_age(3);
    let mut field = LifeField::with_config(config).unwrap();
    field.fill_rect(5, 5, 2, 2, 1).unwrap();

    field.step_n(10);

    assert_eq!(age(&field, 5, 5), 3);
    assert_eq!(age(&field, 6, 6), 3);
}

#[test]
fn protected_cells_keep_their_age_for_every_neighbor_count() {
    const OFFSETS: [(usize, usize); 8] = [
        (0, 0),
        (1, 0),
        (2, 0),
        (0, 1),
        (2, 1),
        (0, 2),
        (1, 2),
        (2, 2),
    ];
    let mut field = new_field();
    let mut centers = Vec::new();
    for n in 0..=8 {
        for (row, center_age) in [(1usize, 5u32), (6, 0)] {
            let (ox, oy) = (1 + 4 * n, row);
            for &(dx, dy) in &OFFSETS[..n] {
                field.fill_rect(ox + dx, oy + dy, 1, 1, 1).unwrap();
            }
            let (cx, cy) = (ox + 1, oy + 1);
            field.fill_rect(cx, cy, 1, 1, center_age).unwrap();
            field.toggle_protection(cx, cy).unwrap();
            centers.push((cx, cy, center_age));
        }
    }

    for _ in 0..3 {
        field.step();
        for &(x, y, expected) in &centers {
            assert_eq!(age(&field, x, y), expected, "protected cell ({x},{y})");
        }
    }
}

#[test]
fn toggle_cell_is_rejected_on_protected_cells() {
    let mut field = new_field();
    field.toggle_protection(10, 10).unwrap();
    assert!(!field.toggle_cell(10, 10).unwrap());
    assert_eq!(age(&field, 10, 10), 0);

    field.toggle_protection(10, 10).unwrap();
    assert!(field.toggle_cell(10, 10).unwrap());
    assert_eq!(age(&field, 10, 10), 1);
    assert!(field.toggle_cell(10, 10).unwrap());
    assert_eq!(age(&field, 10, 10), 0);
}

#[test]
fn negate_rect_skips_protected() {
    let mut field = new_field();
    field.fill_rect(2, 2, 2, 1, 9).unwrap();
    field.toggle_protection(2, 2).unwrap();

    field.negate_rect(2, 2, 3, 1).unwrap();

    assert_eq!(age(&field, 2, 2), 9);
    assert_eq!(age(&field, 3, 2), 0);
    assert_eq!(age(&field, 4, 2), 1);
}

#[test]
fn out_of_range_edits_are_reported() {
    let mut field = new_field();
    assert!(matches!(
        field.query(SIZE, 0),
        Err(FieldError::OutOfRange { x: 64, y: 0, .. })
    ));
    assert!(field.toggle_cell(0, SIZE).is_err());
    assert!(field.toggle_protection(SIZE, SIZE).is_err());
    assert!(field.negate_rect(SIZE - 2, 0, 3, 1).is_err());
    assert!(field.fill_rect(0, SIZE - 1, 1, 2, 1).is_err());
    assert!(field.set_alive_cells(&[(1, 1), (SIZE, 1)]).is_err());
    assert_eq!(age(&field, 1, 1), 0, "batch must be atomic");
}

#[test]
fn reads_past_the_right_edge_do_not_alias_the_next_row() {
    let mut field = new_field();
    set_cells(&mut field, &[(0, 1)]);

    assert!(matches!(
        field.query(SIZE, 0),
        Err(FieldError::OutOfRange { x: 64, y: 0, .. })
    ));
    assert!(field.query(SIZE + 1, 0).is_err());
    assert_eq!(age(&field, 0, 1), 1);
    assert_eq!(age(&field, SIZE - 1, 0), 0);
}

#[test]
fn fill_rect_clamps_to_max_age() {
    let config = EngineConfig::default().max_age(50);
    let mut field = LifeField::with_config(config).unwrap();

    field.fill_rect(3, 3, 2, 1, 1_000).unwrap();

    assert_eq!(age(&field, 3, 3), 50);
    assert_eq!(age(&field, 4, 3), 50);
}

#[test]
fn fill_protect_rect_freezes_and_releases_a_region() {
    let mut field = new_field();
    let row = [(10, 20), (11, 20), (12, 20)];
    set_cells(&mut field, &row);
    field.fill_protect_rect(10, 20, 3, 1, true).unwrap();

    field.step_n(3);

    for (x, y) in row {
        let cell = field.query(x, y).unwrap();
        assert!(cell.protected, "({x},{y}) protected");
        assert_eq!(cell.age, 1, "protected cells do not age");
    }

    field.fill_protect_rect(10, 20, 3, 1, false).unwrap();
    assert!(!field.query(11, 20).unwrap().protected);
    assert!(field.fill_protect_rect(SIZE - 1, 0, 2, 1, true).is_err());
}

#[test]
fn editing_the_rules_area_changes_the_next_step() {
    let mut field = new_field();
    let (bx, by) = field.rules_area().read_cell(Column::Birth, 3);
    set_cells(&mut field, &[(5, 40), (6, 40), (7, 40)]);

    // A live birth indicator switches birth off for that count.
    assert!(field.toggle_cell(bx, by).unwrap());
    assert!(!field.pending_rules().birth[3]);

    field.step();

    assert_eq!(field.rules().to_string(), "B/D0145678");
    assert_alive(&field, &[(6, 40)]);
    assert_dead(&field, &[(5, 40), (7, 40), (6, 39), (6, 41)]);
    // The lone indicator cell died under D0, so birth on 3 is back.
    assert_dead(&field, &[(bx, by)]);
    assert_eq!(field.pending_rules(), RuleTable::conway());
}

#[test]
fn step_is_deterministic() {
    let run = || {
        let mut field = new_field();
        seed_soup(&mut field, 0xD37E_A515, 0.3);
        field.step_n(20);
        (field.buffers().ages().to_vec(), field.rules())
    };
    assert_eq!(run(), run());
}

#[test]
fn matches_naive_stepper_on_random_soup() {
    let mut field = new_field();
    seed_soup(&mut field, 0xBADC0FFEE, 0.35);
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..40 {
        let (x, y) = (rng.random_range(0..SIZE), rng.random_range(0..SIZE));
        field.toggle_protection(x, y).unwrap();
    }

    for _ in 0..12 {
        let rules = field.pending_rules();
        let expected = step_naive(
            field.buffers().ages(),
            field.buffers().protection(),
            &rules,
            SIZE,
        );
        field.step();
        assert_eq!(field.rules(), rules);
        assert_eq!(field.buffers().ages(), expected.as_slice());
    }
}

#[test]
fn threaded_step_matches_serial() {
    let run = |threads: usize| {
        let config = EngineConfig::default()
            .field_size_log(7)
            .thread_count(threads)
            .seed(1);
        let mut field = LifeField::with_config(config).unwrap();
        seed_soup(&mut field, 0xA1, 0.42);
        field.step_n(15);
        (field.buffers().ages().to_vec(), field.alive_count())
    };
    assert_eq!(run(1), run(4));
}

#[test]
fn reset_restores_pattern_and_counter() {
    let mut field = new_field();
    let pristine = field.buffers().ages().to_vec();
    seed_soup(&mut field, 3, 0.2);
    field.step_n(5);

    field.reset().unwrap();

    assert_eq!(field.generation_count(), 0);
    assert_eq!(field.buffers().ages(), pristine.as_slice());
    let protected = field.buffers().protection().iter().filter(|&&p| p).count();
    assert_eq!(protected, 2);
}

#[test]
fn reset_with_gliders_places_four_gliders() {
    let mut field = new_field();
    let base = field.alive_count();
    field.reset_with_gliders().unwrap();
    assert_eq!(field.alive_count(), base + 20);
    let corners = [(2, 1), (SIZE - 3, 1), (2, SIZE - 2), (SIZE - 3, SIZE - 2)];
    assert_alive(&field, &corners);
}
