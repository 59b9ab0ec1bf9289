use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use image::GrayImage;

use hexcode::{HexBuilder, HexReader};

mod utils;
use utils::*;

const PAYLOADS: [&str; 6] = [
    "a",
    "hexagon",
    "Hello, World!",
    "https://example.com/a/longer/path?with=query",
    "The quick brown fox jumps over the lazy dog, twice over and then some more.",
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
];

const SCALES: [f64; 3] = [0.7, 1.0, 1.5];

type Distortion = fn(&GrayImage) -> GrayImage;

// Synthetic distortion suites, each maps a clean rendering onto the image handed to the reader
fn suites() -> Vec<(&'static str, Distortion)> {
    let suites: [(&str, Distortion); 7] = [
        ("clean", |img: &GrayImage| img.clone()),
        ("rotate_10", |img: &GrayImage| rotate(img, 10.0)),
        ("rotate_45", |img: &GrayImage| rotate(img, 45.0)),
        ("rotate_135", |img: &GrayImage| rotate(img, 135.0)),
        ("tilt_5", |img: &GrayImage| tilt(img, 0.05)),
        ("tilt_10", |img: &GrayImage| tilt(img, 0.10)),
        ("shade", |img: &GrayImage| shade(img, 120)),
    ];
    suites.to_vec()
}

// A detection counts when the ring count and every sampled slot match the rendered code
fn benchmark() {
    let suites = suites();
    let cases: Vec<_> = (0..suites.len())
        .flat_map(|s| PAYLOADS.iter().flat_map(move |p| SCALES.iter().map(move |&sc| (s, *p, sc))))
        .collect();

    let results = Arc::new(Mutex::new(HashMap::<String, HashMap<String, f64>>::new()));
    let runtimes = Arc::new(Mutex::new(HashMap::<String, Vec<u128>>::new()));

    cases.par_iter().for_each(|&(suite, payload, scale)| {
        let (name, distort) = &suites[suite];
        let code = HexBuilder::new(payload.as_bytes()).build().unwrap();
        let img = distort(&code.to_image(scale));

        let start = Instant::now();
        let detection = HexReader::new().detect(&img);
        let time = start.elapsed().as_micros();

        let passed = match detection {
            Ok(det) => det.ring_count() == code.ring_count() && &det.bits == code.bits(),
            Err(_) => false,
        };
        if !passed {
            println!("\x1b[1;31m[FAIL]\x1b[0m {name} {payload:?} at scale {scale}");
        }

        let mut results = results.lock().unwrap();
        let mut runtimes = runtimes.lock().unwrap();

        let score = results.entry(name.to_string()).or_default();
        *score.entry("pass".to_string()).or_default() += passed as u8 as f64;
        *score.entry("fail".to_string()).or_default() += !passed as u8 as f64;

        runtimes.entry(name.to_string()).or_default().push(time);
    });

    let mut results = Arc::try_unwrap(results).unwrap().into_inner().unwrap();
    let mut runtimes = Arc::try_unwrap(runtimes).unwrap().into_inner().unwrap();

    let mut total: HashMap<String, f64> = HashMap::new();
    for (k, v) in results.iter_mut() {
        let pass = *v.get("pass").unwrap();
        let fail = *v.get("fail").unwrap();
        let rate = pass / (pass + fail);
        let median_time = median(runtimes.get_mut(k).unwrap()) as f64;

        v.insert("pass_rate".to_string(), rate);
        v.insert("median_time".to_string(), median_time);

        *total.entry("pass".to_string()).or_default() += pass;
        *total.entry("fail".to_string()).or_default() += fail;
        *total.entry("median_time".to_string()).or_default() += median_time;
    }

    let count = results.len() as f64;
    let pass = total["pass"];
    let fail = total["fail"];
    total.insert("pass_rate".to_string(), pass / (pass + fail));
    *total.entry("median_time".to_string()).or_default() /= count;

    results.insert("total".to_string(), total);

    let mut rows = results.keys().map(|s| s.as_str()).collect::<Vec<_>>();
    rows.sort_unstable();
    let cols = ["Distortion", "pass", "fail", "pass_rate", "median_time"];

    print_table(&results, &rows, &cols);
}

fn main() {
    let start = Instant::now();
    benchmark();
    println!("time elapsed: {:?}", start.elapsed());
}
