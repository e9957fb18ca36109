use std::io::Cursor;

use fat_extract::filesystem::cluster_chain::ChainResolver;
use fat_extract::filesystem::dir_entry::ATTR_DIRECTORY;
use fat_extract::traits::LayoutDisplay;
use fat_extract::{FATError, FATVol};

const BYTES_PER_SEC: usize = 512;
const SEC_PER_CLUS: usize = 8;
const CLUSTER_SIZE: usize = BYTES_PER_SEC * SEC_PER_CLUS;
const RSVD_SEC_CNT: usize = 32;
const NUM_FAT: usize = 2;
const FAT_SZ: usize = 1;
const FAT_OFFSET: usize = RSVD_SEC_CNT * BYTES_PER_SEC;
const DATA_OFFSET: usize = FAT_OFFSET + NUM_FAT * FAT_SZ * BYTES_PER_SEC;
const EOC: u32 = 0x0FFF_FFFF;

/// In-memory FAT32 image with a root directory at cluster 2.
struct ImageBuilder {
    image: Vec<u8>,
    fat: Vec<u32>,
}

impl ImageBuilder {
    fn new(clusters: usize) -> Self {
        let mut image = vec![0u8; DATA_OFFSET + clusters * CLUSTER_SIZE];
        image[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
        image[0x0B..0x0D].copy_from_slice(&(BYTES_PER_SEC as u16).to_le_bytes());
        image[0x0D] = SEC_PER_CLUS as u8;
        image[0x0E..0x10].copy_from_slice(&(RSVD_SEC_CNT as u16).to_le_bytes());
        image[0x10] = NUM_FAT as u8;
        image[0x24..0x28].copy_from_slice(&(FAT_SZ as u32).to_le_bytes());
        image[0x2C..0x30].copy_from_slice(&2u32.to_le_bytes());
        image[0x1FE] = 0x55;
        image[0x1FF] = 0xAA;

        let mut fat = vec![0u32; FAT_SZ * BYTES_PER_SEC / 4];
        fat[0] = 0x0FFF_FFF8;
        fat[1] = EOC;
        fat[2] = EOC;
        Self { image, fat }
    }

    fn link(mut self, chain: &[u32]) -> Self {
        for pair in chain.windows(2) {
            self.fat[pair[0] as usize] = pair[1];
        }
        if let Some(last) = chain.last() {
            self.fat[*last as usize] = EOC;
        }
        self
    }

    fn set_fat(mut self, cluster: u32, value: u32) -> Self {
        self.fat[cluster as usize] = value;
        self
    }

    fn fill(mut self, cluster: u32, data: &[u8]) -> Self {
        let start = DATA_OFFSET + (cluster as usize - 2) * CLUSTER_SIZE;
        self.image[start..start + data.len()].copy_from_slice(data);
        self
    }

    fn entry(
        mut self,
        dir_cluster: u32,
        slot: usize,
        raw_name: &[u8; 11],
        attr: u8,
        cluster: u32,
        size: u32,
    ) -> Self {
        let start = DATA_OFFSET + (dir_cluster as usize - 2) * CLUSTER_SIZE + slot * 32;
        let buf = &mut self.image[start..start + 32];
        buf[0..11].copy_from_slice(raw_name);
        buf[0x0B] = attr;
        buf[0x14..0x16].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
        buf[0x1A..0x1C].copy_from_slice(&(cluster as u16).to_le_bytes());
        buf[0x1C..0x20].copy_from_slice(&size.to_le_bytes());
        self
    }

    fn build(mut self) -> Cursor<Vec<u8>> {
        let fat: Vec<u8> = self.fat.iter().flat_map(|e| e.to_le_bytes()).collect();
        for i in 0..NUM_FAT {
            let start = FAT_OFFSET + i * fat.len();
            self.image[start..start + fat.len()].copy_from_slice(&fat);
        }
        Cursor::new(self.image)
    }
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

/// Root: HELLO.TXT (5000 bytes, 4 -> 5), BIG.BIN (3 clusters, 6 -> 8 -> 7),
/// EMPTY.TXT, LOOP.BIN (9 -> 9) and the DOCS directory (3) holding NOTE.TXT (10).
fn sample_image() -> Cursor<Vec<u8>> {
    let hello = pattern(5000, 1);
    let big = pattern(3 * CLUSTER_SIZE, 7);

    ImageBuilder::new(9)
        .link(&[3])
        .link(&[4, 5])
        .link(&[6, 8, 7])
        .set_fat(9, 9)
        .link(&[10])
        .entry(2, 0, b"SAMPLE     ", 0x08, 0, 0)
        .entry(2, 1, b"HELLO   TXT", 0x20, 4, 5000)
        .entry(2, 2, b"BIG     BIN", 0x20, 6, big.len() as u32)
        .entry(2, 3, b"EMPTY   TXT", 0x20, 0, 0)
        .entry(2, 4, b"LOOP    BIN", 0x20, 9, 8192)
        .entry(2, 5, b"DOCS       ", ATTR_DIRECTORY, 3, 0)
        .entry(3, 0, b"NOTE    TXT", 0x20, 10, 10)
        .fill(4, &hello[..CLUSTER_SIZE])
        .fill(5, &hello[CLUSTER_SIZE..])
        .fill(6, &big[..CLUSTER_SIZE])
        .fill(8, &big[CLUSTER_SIZE..2 * CLUSTER_SIZE])
        .fill(7, &big[2 * CLUSTER_SIZE..])
        .fill(10, b"note text!")
        .build()
}

#[test]
fn opens_volume_and_derives_layout() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();

    assert_eq!(*vol.header().cluster_size(), CLUSTER_SIZE as u32);
    assert_eq!(*vol.header().fat_offset(), FAT_OFFSET as u64);
    assert_eq!(*vol.header().data_area_offset(), DATA_OFFSET as u64);
    assert_eq!(vol.table().len(), FAT_SZ * BYTES_PER_SEC / 4);

    let layout = vol.display_layout(0).unwrap();
    assert!(layout.contains("FAT #1"));
}

#[test]
fn extracts_partial_last_cluster() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();

    let record = vol.find_file(&mut image, "HELLO.TXT").unwrap();
    assert_eq!(record.file_name(), "HELLO.TXT");
    assert_eq!(vol.clusters(*record.start_cluster()).unwrap(), vec![4, 5]);

    let mut out = vec![];
    let written = vol.extract_record(&mut image, &record, &mut out).unwrap();
    assert_eq!(written, 5000);
    assert_eq!(out, pattern(5000, 1));
}

#[test]
fn extracts_whole_clusters_in_chain_order() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();

    let mut out = vec![];
    vol.extract_file(&mut image, "big.bin", &mut out).unwrap();
    assert_eq!(out, pattern(3 * CLUSTER_SIZE, 7));
}

#[test]
fn extracts_from_sub_directory() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();

    let mut out = vec![];
    vol.extract_file(&mut image, "/DOCS/NOTE.TXT", &mut out).unwrap();
    assert_eq!(out, b"note text!");
}

#[test]
fn empty_file_extracts_to_nothing() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();

    let mut out = vec![];
    assert_eq!(vol.extract_file(&mut image, "EMPTY.TXT", &mut out).unwrap(), 0);
    assert!(out.is_empty());
}

#[test]
fn self_referencing_chain_is_detected() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();

    let mut out = vec![];
    assert!(matches!(
        vol.extract_file(&mut image, "LOOP.BIN", &mut out),
        Err(FATError::PossibleCycle { start: 9, cluster: 9 })
    ));
    assert!(out.is_empty());
}

#[test]
fn chain_limit_is_applied() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true)
        .unwrap()
        .with_resolver(ChainResolver::with_max_len(2));

    let mut out = vec![];
    assert!(vol.extract_file(&mut image, "HELLO.TXT", &mut out).is_ok());
    assert!(matches!(
        vol.extract_file(&mut image, "BIG.BIN", &mut out),
        Err(FATError::ChainTooLong { start: 6, limit: 2 })
    ));
}

#[test]
fn missing_paths_are_reported() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();

    assert!(matches!(
        vol.find_file(&mut image, "NOPE.TXT"),
        Err(FATError::FileNotFound(_))
    ));
    assert!(matches!(
        vol.find_file(&mut image, ""),
        Err(FATError::FileNotFound(_))
    ));
    assert!(matches!(
        vol.find_file(&mut image, "HELLO.TXT/INNER"),
        Err(FATError::NotADirectory(_))
    ));
    // The volume label is not a file.
    assert!(matches!(
        vol.find_file(&mut image, "SAMPLE"),
        Err(FATError::FileNotFound(_))
    ));
}

#[test]
fn truncated_image_is_a_short_read() {
    let mut image = sample_image();
    let vol = FATVol::open(&mut image, true).unwrap();
    let record = vol.find_file(&mut image, "HELLO.TXT").unwrap();

    // Cut the image in the middle of cluster 5.
    image.get_mut().truncate(DATA_OFFSET + 3 * CLUSTER_SIZE + 100);

    let mut out = vec![];
    assert!(matches!(
        vol.extract_record(&mut image, &record, &mut out),
        Err(FATError::ShortRead { requested: 904, available: 100, .. })
    ));
}

#[test]
fn malformed_header_is_rejected_before_reading_the_table() {
    let mut raw = sample_image().into_inner();
    raw[0x0B..0x0D].copy_from_slice(&0u16.to_le_bytes());
    raw.truncate(512);

    assert!(matches!(
        FATVol::open(&mut Cursor::new(raw), false),
        Err(FATError::MalformedHeader(_))
    ));
}

#[test]
fn huge_fat_size_is_a_short_read() {
    // 4096-byte sectors and a FAT claiming 0xFFFFFFFF sectors, in a single-sector image.
    let mut raw = vec![0u8; 4096];
    raw[0x0B..0x0D].copy_from_slice(&4096u16.to_le_bytes());
    raw[0x0D] = 1;
    raw[0x0E..0x10].copy_from_slice(&1u16.to_le_bytes());
    raw[0x10] = 2;
    raw[0x24..0x28].copy_from_slice(&u32::MAX.to_le_bytes());
    raw[0x2C..0x30].copy_from_slice(&2u32.to_le_bytes());
    raw[0x1FE] = 0x55;
    raw[0x1FF] = 0xAA;

    assert!(matches!(
        FATVol::open(&mut Cursor::new(raw), false),
        Err(FATError::ShortRead { offset: 4096, available: 0, .. })
    ));
}
