//! Making divisor query structures for monomials stored as `Vec<i32>`.

use divquery::{BasicConfig, DivFinder, DivList, DivListOptions, KDTree, KDTreeOptions};

fn main() {
    example_kdtree();
    example_div_list();
}

fn example_kdtree() {
    println!("=== KDTree ===\n");

    // Two variables, exponents are i32, div masks on entries.
    let conf: BasicConfig<i32> = BasicConfig::new(2);
    let mut tree = KDTree::new(conf, KDTreeOptions::default());

    let a = vec![3, 2];
    tree.insert(a.clone());
    tree.insert(vec![1, 4]);

    // x^5 has no divisor: (3,2) needs y^2 and (1,4) needs y^4.
    let c = [5, 0];
    assert_eq!(tree.find_divisor(&c), None);
    println!("divisor of {:?}: {:?}", c, tree.find_divisor(&c));

    // x^5 y^2 is divisible by a.
    let c = [5, 2];
    assert_eq!(tree.find_divisor(&c), Some(&a));
    println!("divisor of {:?}: {:?}", c, tree.find_divisor(&c));

    println!("{} ({} entries, {} bytes)\n", tree.name(), tree.len(), tree.memory_usage());
}

fn example_div_list() {
    println!("=== DivList ===\n");

    let conf: BasicConfig<i32> = BasicConfig::new(2);
    let mut list = DivList::new(conf, DivListOptions::default());

    // Keep only the minimal generators of the monomial ideal.
    for m in [vec![2, 2], vec![3, 1], vec![1, 3], vec![1, 1], vec![0, 5]] {
        let inserted = list.insert_reduce(m.clone());
        println!("insert_reduce {m:?}: {inserted}");
    }
    let generators: Vec<&Vec<i32>> = list.iter().collect();
    println!("minimal generators: {generators:?}");
    println!("{} ({} entries)\n", list.name(), list.len());
}
