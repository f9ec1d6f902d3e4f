use rust_decimal::Decimal;

use super::book::{MatrixEntry, TariffBook, TariffClassId, TariffRate, ZoneId, SAME_CITY_ZONE};
use super::DeliveryMethod;

const ZONES: &[(u8, &[&str])] = &[
    (1, &["москва", "санкт-петербург"]),
    (
        2,
        &[
            "балашиха",
            "химки",
            "подольск",
            "мытищи",
            "королёв",
            "люберцы",
            "красногорск",
            "колпино",
            "пушкин",
            "гатчина",
        ],
    ),
    (
        3,
        &[
            "казань",
            "нижний новгород",
            "ярославль",
            "воронеж",
            "тверь",
            "тула",
            "рязань",
            "владимир",
            "калуга",
            "смоленск",
            "великий новгород",
        ],
    ),
    (
        4,
        &[
            "ростов-на-дону",
            "краснодар",
            "волгоград",
            "самара",
            "саратов",
            "таганрог",
            "новочеркасск",
            "шахты",
            "батайск",
            "каменск-шахтинский",
        ],
    ),
    (5, &["екатеринбург", "челябинск", "пермь", "уфа", "тюмень", "курган", "оренбург"]),
    (
        6,
        &[
            "новосибирск",
            "омск",
            "томск",
            "красноярск",
            "барнаул",
            "иркутск",
            "сургут",
            "ханты-мансийск",
            "нефтеюганск",
            "нижневартовск",
        ],
    ),
];

const ROSTOV_AGGLOMERATION: &str = "zone4_rostov_agglomeration";
const TYUMEN_CORRIDOR: &str = "zone5_tyumen_corridor";
const YUGRA: &str = "zone6_yugra";

const SPECIAL_CITIES: &[(&str, &[&str])] = &[
    (ROSTOV_AGGLOMERATION, &["таганрог", "новочеркасск", "батайск", "шахты"]),
    (TYUMEN_CORRIDOR, &["тюмень", "курган"]),
    (YUGRA, &["ханты-мансийск", "нефтеюганск", "нижневартовск"]),
];

enum Cell {
    Flat(u8),
    Conditional(u8, u8, &'static str),
}

use Cell::{Conditional, Flat};

/// Rows are origin zones 1..=6, columns destination zones 1..=6.
const MATRIX: [[Cell; 6]; 6] = [
    [Flat(1), Flat(2), Flat(3), Flat(4), Flat(5), Flat(6)],
    [Flat(2), Flat(1), Flat(3), Flat(4), Flat(5), Flat(6)],
    [Flat(3), Flat(3), Flat(2), Flat(4), Flat(5), Flat(6)],
    [Flat(4), Flat(4), Flat(4), Conditional(2, 3, ROSTOV_AGGLOMERATION), Flat(5), Flat(6)],
    [Flat(5), Flat(5), Flat(5), Flat(5), Flat(2), Conditional(4, 5, TYUMEN_CORRIDOR)],
    [Flat(6), Flat(6), Flat(6), Flat(6), Flat(5), Conditional(3, 4, YUGRA)],
];

/// `(class, courier base, courier per kg, pickup base, pickup per kg)` in kopecks.
const RATES: &[(u8, i64, i64, i64, i64)] = &[
    (0, 30_000, 4_000, 20_000, 3_000),
    (1, 39_000, 5_000, 29_000, 4_000),
    (2, 45_000, 6_000, 34_000, 4_500),
    (3, 52_000, 7_000, 40_000, 5_500),
    (4, 61_000, 8_500, 47_000, 6_500),
    (5, 72_000, 10_000, 56_000, 8_000),
    (6, 89_000, 13_000, 69_000, 10_000),
];

pub(super) fn book() -> TariffBook {
    let mut book = TariffBook::default();

    for (zone, cities) in ZONES {
        for city in *cities {
            let inserted = book.insert_zone(city, ZoneId(*zone));
            debug_assert!(inserted.is_ok(), "built-in city `{city}` is listed in two zones");
        }
    }

    for (set, cities) in SPECIAL_CITIES {
        book.insert_special_cities(set, cities.iter().copied());
    }

    book.insert_entry(SAME_CITY_ZONE, SAME_CITY_ZONE, MatrixEntry::Flat(TariffClassId(0)));
    for (row, cells) in MATRIX.iter().enumerate() {
        for (column, cell) in cells.iter().enumerate() {
            let origin = ZoneId(row as u8 + 1);
            let destination = ZoneId(column as u8 + 1);
            let entry = match cell {
                Flat(class) => MatrixEntry::Flat(TariffClassId(*class)),
                Conditional(special, otherwise, cities) => MatrixEntry::Conditional {
                    special: TariffClassId(*special),
                    otherwise: TariffClassId(*otherwise),
                    cities: (*cities).to_string(),
                },
            };
            book.insert_entry(origin, destination, entry);
        }
    }

    for &(class, courier_base, courier_per_kg, pickup_base, pickup_per_kg) in RATES {
        let class = TariffClassId(class);
        book.insert_rate(
            class,
            DeliveryMethod::Courier,
            TariffRate {
                base: Decimal::new(courier_base, 2),
                per_kg: Decimal::new(courier_per_kg, 2),
            },
        );
        book.insert_rate(
            class,
            DeliveryMethod::Pickup,
            TariffRate {
                base: Decimal::new(pickup_base, 2),
                per_kg: Decimal::new(pickup_per_kg, 2),
            },
        );
    }

    book
}
