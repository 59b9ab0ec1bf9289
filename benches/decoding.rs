use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use walkdir::WalkDir;

use hexcode::HexReader;

mod utils;
use utils::*;

// Reads every image of the dataset at four orientations. Images are grouped by their parent
// folder and each one has its payload stored in a sibling `.txt` file.
fn benchmark(dataset_dir: &Path) {
    let image_paths: Vec<_> = WalkDir::new(dataset_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(is_image_file)
        .map(|e| e.path().to_path_buf())
        .collect();

    if image_paths.is_empty() {
        println!("No images found in {}", dataset_dir.display());
        println!("Render some with: cargo run --example generate -- <payload> <dir>/<name>.png");
        return;
    }

    let results = Arc::new(Mutex::new(HashMap::<String, HashMap<String, u128>>::new()));
    let runtimes = Arc::new(Mutex::new(HashMap::<String, Vec<u128>>::new()));

    image_paths.par_iter().for_each(|img_path| {
        let parent = get_parent(img_path);
        let path_str = img_path.to_str().unwrap();
        let exp_payload = parse_expected_payload(&img_path.with_extension("txt"));

        let gray = image::open(img_path).unwrap().to_luma8();
        let mut reader = HexReader::new();
        for angle in [0, 90, 180, 270].iter() {
            let img = match angle {
                90 => image::imageops::rotate90(&gray),
                180 => image::imageops::rotate180(&gray),
                270 => image::imageops::rotate270(&gray),
                _ => gray.clone(),
            };

            let start = Instant::now();
            let res = reader.read(&img);
            let elapsed = start.elapsed();

            runtimes.lock().unwrap().entry(parent.clone()).or_default().push(elapsed.as_micros());

            match res {
                Ok(payload) if payload == exp_payload => {
                    let mut results = results.lock().unwrap();
                    *results
                        .entry(parent.clone())
                        .or_default()
                        .entry(angle.to_string())
                        .or_default() += 1;
                }
                Ok(_) => {
                    println!("\x1b[1;31m[FAIL]\x1b[0m {path_str} at {angle}deg: wrong payload")
                }
                Err(e) => println!("\x1b[1;31m[FAIL]\x1b[0m {path_str} at {angle}deg: {e}"),
            }
        }
    });

    let mut results = Arc::try_unwrap(results).unwrap().into_inner().unwrap();
    let mut runtimes = Arc::try_unwrap(runtimes).unwrap().into_inner().unwrap();

    // Folders where nothing was read still get a row
    for k in runtimes.keys() {
        results.entry(k.clone()).or_default();
    }

    // Successes, median and average time per folder
    let mut total: HashMap<String, u128> = HashMap::new();
    for (k, v) in results.iter_mut() {
        let total_for_folder = v.values().sum::<u128>();
        v.insert("total".to_string(), total_for_folder);

        let runtime = runtimes.get_mut(k).unwrap();
        let avg_time = runtime.iter().sum::<u128>() / runtime.len() as u128;
        v.insert("median_time".to_string(), median(runtime));
        v.insert("avg_time".to_string(), avg_time);

        for (kc, vc) in v.iter() {
            *total.entry(kc.to_string()).or_default() += vc;
        }
    }
    let count = results.len() as u128;
    for key in ["median_time", "avg_time"] {
        if let Some(t) = total.get_mut(key) {
            *t /= count;
        }
    }
    results.insert("total".to_string(), total);

    let mut rows = results.keys().map(|s| s.as_str()).collect::<Vec<_>>();
    rows.sort_unstable();
    let cols = ["Angles", "0", "90", "180", "270", "total", "median_time", "avg_time"];

    println!("\nResult:");
    print_table(&results, &rows, &cols);
}

fn main() {
    let dataset_dir = std::path::Path::new("benches/dataset/decoding");

    let start = Instant::now();
    benchmark(dataset_dir);
    println!("Time elapsed: {:?}", start.elapsed());
}
